use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("expected at least 4 fields in FEN, found {0}")]
    MissingFields(usize),
    #[error("invalid piece placement: {0}")]
    Placement(String),
    #[error("invalid side to move: {0}")]
    SideToMove(String),
    #[error("invalid castling rights: {0}")]
    Castling(String),
    #[error("invalid en passant square: {0}")]
    EnPassant(String),
    #[error("invalid move counter: {0}")]
    Counter(String),
    #[error("expected exactly one king per side")]
    Kings,
    #[error("too many non-king pieces ({0}, at most 30 slots)")]
    TooManyPieces(usize),
    #[error("bulletformat conversion failed: {0}")]
    Convert(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("could not parse move: {0}")]
    Parse(String),
    #[error("illegal move {mv} in {fen}")]
    Illegal { mv: String, fen: String },
    #[error("cannot unmake past the root position")]
    AtRoot,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeatureError {
    #[error("index list capacity {capacity} is below the set's max active count {max_active}")]
    Capacity { capacity: usize, max_active: usize },
    #[error("feature set has no members")]
    Empty,
    #[error("unknown architecture: {0}")]
    UnknownArch(String),
    #[error("weights of length {len} are not a multiple of the {dimensions} training inputs")]
    WeightShape { len: usize, dimensions: usize },
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("file of {len} bytes does not hold a whole number of {size} byte positions")]
    Size { len: usize, size: usize },
}
