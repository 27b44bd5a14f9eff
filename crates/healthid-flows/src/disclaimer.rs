//! Disclaimer acknowledgements gating wizard submission. The submit
//! action stays disabled until every box is ticked.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclaimerSet {
    accepted: Vec<bool>,
}

impl DisclaimerSet {
    pub fn new(count: usize) -> Self {
        Self {
            accepted: vec![false; count],
        }
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Returns `false` for an out-of-range index.
    pub fn accept(&mut self, index: usize) -> bool {
        match self.accepted.get_mut(index) {
            Some(slot) => {
                *slot = true;
                true
            }
            None => false,
        }
    }

    pub fn accept_all(&mut self) {
        self.accepted.fill(true);
    }

    pub fn all_accepted(&self) -> bool {
        self.accepted.iter().all(|v| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_box_must_be_ticked() {
        let mut set = DisclaimerSet::new(6);
        assert!(!set.all_accepted());
        for i in 0..5 {
            set.accept(i);
        }
        assert!(!set.all_accepted());
        set.accept(5);
        assert!(set.all_accepted());
        assert!(!set.accept(6));
    }
}
