use crate::{
    chess::{Color, Position, Snapshot},
    error::FeatureError,
    features::{Feature, FeatureType, IndexList},
    logger::ansi,
};

/// How a transition is handled when some member cannot be diffed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Only the members whose trigger fired are recomputed.
    #[default]
    PerFeature,
    /// Any fired member turns the whole update into a refresh.
    WholeSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureSetSettings {
    /// Size of the index lists handed to the accumulator, must hold `max_active` indices.
    pub capacity: usize,
    pub refresh_policy: RefreshPolicy,
}

impl Default for FeatureSetSettings {
    fn default() -> Self {
        Self { capacity: 512, refresh_policy: RefreshPolicy::PerFeature }
    }
}

/// Result of moving from a snapshot to its successor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Update {
    /// The active set has to be recomputed from scratch.
    Refresh,
    Incremental {
        removed: IndexList,
        added: IndexList,
        /// Members that were recomputed as part of the update.
        refreshed: usize,
    },
}

impl Update {
    pub fn is_refresh(&self) -> bool {
        matches!(self, Update::Refresh)
    }
}

/// An ordered list of feature types sharing one input layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSet {
    members: Vec<Feature>,
    offsets: Vec<usize>,
    settings: FeatureSetSettings,
}

impl FeatureSet {
    pub fn new(members: Vec<Feature>, settings: FeatureSetSettings) -> Result<Self, FeatureError> {
        if members.is_empty() {
            return Err(FeatureError::Empty);
        }

        let mut offsets = Vec::with_capacity(members.len());
        let mut offset = 0;
        for feature in &members {
            offsets.push(offset);
            offset += feature.dimensions();
        }

        let set = Self { members, offsets, settings };
        let max_active = set.max_active();
        if settings.capacity < max_active {
            return Err(FeatureError::Capacity { capacity: settings.capacity, max_active });
        }

        Ok(set)
    }

    /// A set with list capacity equal to its maximum number of active inputs.
    pub fn exact(members: Vec<Feature>, refresh_policy: RefreshPolicy) -> Result<Self, FeatureError> {
        let capacity = members.iter().map(FeatureType::max_active).sum();
        Self::new(members, FeatureSetSettings { capacity, refresh_policy })
    }

    pub fn members(&self) -> &[Feature] {
        &self.members
    }

    /// Start of each member's index range.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// The member owning a global index, with the index relative to that member.
    pub fn member_of(&self, idx: usize) -> Option<(&Feature, usize)> {
        if idx >= self.dimensions() {
            return None;
        }

        let member = self.offsets.partition_point(|&offset| offset <= idx) - 1;
        Some((&self.members[member], idx - self.offsets[member]))
    }

    pub fn settings(&self) -> FeatureSetSettings {
        self.settings
    }

    pub fn name(&self) -> String {
        self.members.iter().map(FeatureType::name).collect::<Vec<_>>().join("+")
    }

    pub fn dimensions(&self) -> usize {
        self.members.iter().map(FeatureType::dimensions).sum()
    }

    pub fn max_active(&self) -> usize {
        self.members.iter().map(FeatureType::max_active).sum()
    }

    /// Architecture hash, each member folded over the hash of the members after it.
    pub fn hash(&self) -> u32 {
        self.members.iter().rev().map(FeatureType::hash).reduce(|tail, first| first ^ (tail << 1) ^ (tail >> 31)).unwrap_or(0)
    }

    pub fn new_list(&self) -> IndexList {
        IndexList::with_capacity(self.settings.capacity)
    }

    pub fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        for (feature, &offset) in self.members.iter().zip(&self.offsets) {
            let start = active.len();
            feature.append_active(snap, perspective, active);
            active.shift_from(start, offset);
        }
    }

    pub fn active(&self, snap: &Snapshot, perspective: Color) -> IndexList {
        let mut list = self.new_list();
        self.append_active(snap, perspective, &mut list);
        list
    }

    /// Update for the last transition of `pos`, a refresh if it is at its root.
    pub fn update(&self, pos: &Position, perspective: Color) -> Update {
        match pos.previous() {
            Some(prev) => self.update_between(prev, pos.current(), perspective),
            None => Update::Refresh,
        }
    }

    /// `cur` must be the immediate successor of `prev`.
    pub fn update_between(&self, prev: &Snapshot, cur: &Snapshot, perspective: Color) -> Update {
        let needs_refresh = |feature: &Feature| !feature.is_incremental() || feature.refresh_trigger().fired(prev, cur, perspective);

        if self.settings.refresh_policy == RefreshPolicy::WholeSet && self.members.iter().any(needs_refresh) {
            return Update::Refresh;
        }

        let mut removed = IndexList::with_capacity(2 * self.settings.capacity);
        let mut added = IndexList::with_capacity(2 * self.settings.capacity);
        let mut refreshed = 0;

        for (feature, &offset) in self.members.iter().zip(&self.offsets) {
            let (removed_start, added_start) = (removed.len(), added.len());

            if needs_refresh(feature) {
                feature.append_active(prev, perspective, &mut removed);
                feature.append_active(cur, perspective, &mut added);
                refreshed += 1;
            } else {
                feature.append_changed(prev, cur, perspective, &mut removed, &mut added);
            }

            removed.shift_from(removed_start, offset);
            added.shift_from(added_start, offset);
        }

        Update::Incremental { removed, added, refreshed }
    }

    pub fn display(&self) {
        println!("Feature Set            : {}", ansi(self.name(), "32;1"));

        for (feature, &offset) in self.members.iter().zip(&self.offsets) {
            println!(
                "  {:<21}: offset {}, {} inputs, {} active, refresh when {}",
                feature.name(),
                ansi(offset, 31),
                ansi(feature.dimensions(), 31),
                ansi(feature.max_active(), 31),
                feature.refresh_trigger().description(),
            );
        }

        println!("Dimensions             : {}", ansi(self.dimensions(), 31));
        println!("Max Active             : {}", ansi(self.max_active(), 31));
        println!("Capacity               : {}", ansi(self.settings.capacity, 31));
        println!("Refresh Policy         : {}", ansi(format!("{:?}", self.settings.refresh_policy), 31));
        println!("Hash                   : {}", ansi(format!("{:#010X}", self.hash()), "32;1"));
    }
}
