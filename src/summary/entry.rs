use std::cmp;

/// A single summary entry, the triple (v, g, delta) of the paper
#[derive(Debug, Clone, Copy)]
pub struct Tuple {
    /// The observed sample.
    pub value: f64,
    /// Rank width relative to the previous tuple, never zero.
    pub g: u64,
    /// Additional rank uncertainty carried by this tuple.
    pub delta: u64,
}

impl Tuple {
    pub(crate) fn new(value: f64, g: u64, delta: u64) -> Tuple {
        Tuple { value, g, delta }
    }
}

// Tuples compare by sample alone, g and delta are bookkeeping. NaN never
// reaches a summary so the order among stored tuples is total.
impl PartialEq for Tuple {
    fn eq(&self, other: &Tuple) -> bool {
        self.value == other.value
    }
}

impl PartialOrd for Tuple {
    fn partial_cmp(&self, other: &Tuple) -> Option<cmp::Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ordered_by_value_alone() {
        let a = Tuple::new(1.0, 1, 0);
        let b = Tuple::new(1.0, 7, 3);
        let c = Tuple::new(-0.5, 1, 9);
        assert_eq!(a, b);
        assert!(c < a);
        assert_eq!(Some(cmp::Ordering::Equal), a.partial_cmp(&b));
    }
}
