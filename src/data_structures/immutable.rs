use std::ops::Deref;

/// Wrapper that only hands out shared references to its content.
///
/// Used for the parts of a [Simulator](crate::Simulator) that are frozen once the design is built,
/// the wiring can be read from anywhere but never changed after validation.
///
/// # Example
/// ```
/// # use rtlsim::data_structures::Immutable;
/// let ports: Immutable<Vec<&str>> = vec!["addr", "data_out"].into();
///
/// assert_eq!(ports.len(), 2);
/// assert_eq!(ports.get()[1], "data_out");
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Default)]
pub struct Immutable<T>(T);
impl<T> Immutable<T> {
    pub fn new(i: T) -> Self {
        Self(i)
    }
    #[inline(always)]
    pub fn get(&self) -> &T {
        &self.0
    }
}

impl<T> Deref for Immutable<T> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Immutable<T> {
    fn from(i: T) -> Self {
        Self(i)
    }
}
