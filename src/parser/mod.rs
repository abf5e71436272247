//! Parser layer
//! - traits.rs: Parse error definition
//! - types.rs: Common types (DependencyMap, DependencySource, ResolvedDependencies)
//! - package_json.rs: package.json parser
//! - yarn_lock.rs: yarn.lock parser
//! - reconciler.rs: package.json / yarn.lock reconciliation

pub mod package_json;
pub mod reconciler;
pub mod traits;
pub mod types;
pub mod yarn_lock;

pub use reconciler::reconcile;
pub use traits::ParseError;
pub use types::{DependencyMap, DependencySource, ResolvedDependencies};
pub use yarn_lock::YarnLock;
