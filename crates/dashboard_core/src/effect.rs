use crate::{CycleToken, Target};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start a polling cycle for `target`; results must carry `cycle`.
    Fetch { target: Target, cycle: CycleToken },
    /// Stop whatever cycle is pending for `target`.
    Cancel { target: Target },
}
