pub mod allocator;
pub mod builder;
pub mod filters;
pub mod mana_base;
pub mod presets;
pub mod scoring;

pub use allocator::{allocate, exclude_commander, select_nonlands, Allocation, Category, DeckAssembly};
pub use builder::{DeckBuilder, DeckResult};
pub use mana_base::build_mana_base;
pub use presets::{PowerLevel, Quotas, DECK_SIZE};
pub use scoring::{rank_candidates, score, ScoredCard};
