pub(crate) mod enumerate;
pub(crate) mod filter;
pub(crate) mod inspect;
pub(crate) mod map;
pub(crate) mod pump;
pub(crate) mod recast;
pub(crate) mod relay;
pub(crate) mod skip;
pub(crate) mod take;
