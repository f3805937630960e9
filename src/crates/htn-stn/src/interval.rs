/// A named interval: two time points (`{id}_start`, `{id}_end`) plus the
/// duration constraint between them, as added to an [`crate::Stn`] by
/// [`crate::Stn::add_interval`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub id: String,
    pub start_point: String,
    pub end_point: String,
}

impl Interval {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let start_point = format!("{id}_start");
        let end_point = format!("{id}_end");
        Interval {
            id,
            start_point,
            end_point,
        }
    }
}
