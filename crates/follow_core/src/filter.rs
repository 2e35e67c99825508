use crate::Followee;

/// User-selected "only" filters. Both are plain predicates over the flags;
/// an unknown flag never passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub verified_only: bool,
    pub private_only: bool,
}

impl FilterOptions {
    pub fn is_active(&self) -> bool {
        self.verified_only || self.private_only
    }

    pub fn matches(&self, followee: &Followee) -> bool {
        (!self.verified_only || followee.verified.is_yes())
            && (!self.private_only || followee.private.is_yes())
    }
}

pub fn verified_only(followees: Vec<Followee>) -> Vec<Followee> {
    followees.into_iter().filter(|f| f.verified.is_yes()).collect()
}

pub fn private_only(followees: Vec<Followee>) -> Vec<Followee> {
    followees.into_iter().filter(|f| f.private.is_yes()).collect()
}

/// Keeps the followees matching `options`, preserving order.
pub fn apply_filters(followees: Vec<Followee>, options: FilterOptions) -> Vec<Followee> {
    if !options.is_active() {
        return followees;
    }
    followees
        .into_iter()
        .filter(|f| options.matches(f))
        .collect()
}
