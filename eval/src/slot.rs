/// A per-material evaluator that may be absent, meaning that evaluator is
/// inactive for that material. Absence is normal control flow, never an
/// `Error` variant.
pub enum Slot<T> {
    Present(T),
    Absent,
}

impl<T> Slot<T> {
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Slot::Present(t) => Some(t),
            Slot::Absent => None,
        }
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Slot::Present(_))
    }
}

impl<T> From<Option<T>> for Slot<T> {
    #[inline]
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(t) => Slot::Present(t),
            None => Slot::Absent,
        }
    }
}

impl<T> Default for Slot<T> {
    #[inline]
    fn default() -> Self {
        Slot::Absent
    }
}

/// A length-`M` sequence of `Slot<T>`, one per material.
pub type Roster<T> = Vec<Slot<T>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_by_default() {
        let slot: Slot<u32> = Slot::default();
        assert!(!slot.is_present());
        assert_eq!(slot.as_ref(), None);
    }

    #[test]
    fn option_conversion_round_trips() {
        let slot: Slot<u32> = Some(42).into();
        assert!(slot.is_present());
        assert_eq!(slot.as_ref(), Some(&42));

        let absent: Slot<u32> = None.into();
        assert!(!absent.is_present());
    }
}
