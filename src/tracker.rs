use crate::{
    chess::{Color, Position},
    feature_set::{FeatureSet, Update},
    features::IndexList,
};

/// Active sets of both perspectives for every generation of a line of play,
/// following make/unmake the way an accumulator stack does.
#[derive(Clone, Debug)]
pub struct ActiveIndices<'a> {
    set: &'a FeatureSet,
    /// Generation of the position the tracker was created from.
    base: usize,
    stack: Vec<[IndexList; 2]>,
    transitions: usize,
    refreshes: usize,
}

impl<'a> ActiveIndices<'a> {
    pub fn new(set: &'a FeatureSet, pos: &Position) -> Self {
        let snap = pos.current();
        let root = [set.active(snap, Color::White), set.active(snap, Color::Black)];

        let mut stack = Vec::with_capacity(64);
        stack.push(root);

        Self { set, base: pos.generation(), stack, transitions: 0, refreshes: 0 }
    }

    /// Applies the update for the move `pos` just made.
    pub fn push(&mut self, pos: &Position) {
        assert_eq!(self.generation() + 1, pos.generation(), "Tracker is not one generation behind the position!");
        let snap = pos.current();

        let mut next = [self.set.new_list(), self.set.new_list()];
        for perspective in Color::ALL {
            let p = perspective.index();

            next[p] = match self.set.update(pos, perspective) {
                Update::Refresh => {
                    self.refreshes += 1;
                    self.set.active(snap, perspective)
                }
                Update::Incremental { removed, added, refreshed } => {
                    self.refreshes += usize::from(refreshed > 0);

                    let mut list = self.stack[self.stack.len() - 1][p].clone();
                    for &idx in &removed {
                        assert!(list.remove(idx), "Removed index {idx} was not active!");
                    }

                    for &idx in &added {
                        list.push(idx);
                    }

                    list
                }
            };
        }

        self.transitions += 1;
        self.stack.push(next);
    }

    /// Drops the newest generation, mirroring [`Position::unmake_move`].
    /// The generation the tracker started from is never dropped.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn current(&self, perspective: Color) -> &IndexList {
        &self.stack[self.stack.len() - 1][perspective.index()]
    }

    pub fn generation(&self) -> usize {
        self.base + self.stack.len() - 1
    }

    /// Number of pushes so far.
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    /// Number of perspective updates that had to recompute something.
    pub fn refreshes(&self) -> usize {
        self.refreshes
    }

    /// Whether the tracked sets match a full recompute of `pos`.
    pub fn matches(&self, pos: &Position) -> bool {
        Color::ALL.into_iter().all(|perspective| {
            self.current(perspective).sorted() == self.set.active(pos.current(), perspective).sorted()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature_set::RefreshPolicy,
        features::{HalfKP, Side, KK, PP},
    };

    #[test]
    fn follows_make_and_unmake() {
        let set = FeatureSet::exact(vec![HalfKP::new(Side::Friend).into(), KK.into(), PP.into()], RefreshPolicy::PerFeature)
            .unwrap();

        let mut pos = Position::startpos();
        let mut tracker = ActiveIndices::new(&set, &pos);

        for uci in ["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5", "e1e2"] {
            pos.make_uci(uci).unwrap();
            tracker.push(&pos);
            assert!(tracker.matches(&pos), "after {uci}");
        }

        pos.unmake_move().unwrap();
        tracker.pop();
        pos.unmake_move().unwrap();
        tracker.pop();
        assert!(tracker.matches(&pos));
        assert_eq!(tracker.generation(), 5);

        pos.make_uci("g8f6").unwrap();
        tracker.push(&pos);
        assert!(tracker.matches(&pos));
        assert_eq!(tracker.transitions(), 8);
    }
}
