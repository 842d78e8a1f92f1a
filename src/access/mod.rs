//! Path-based access control.
//!
//! The backend returns, per user, the menu tree of the groups the user
//! belongs to. Navigation is gated by flattening that tree into an
//! [`AllowedPathSet`] and asking the [`PathAccessResolver`] whether the
//! target path is covered:
//!
//! | Module     | Responsibility                                          |
//! |------------|---------------------------------------------------------|
//! | `paths`    | Path normalization and tree flattening                  |
//! | `resolver` | Ordered allow rules, default deny                       |
//! | `menu`     | Building menu trees from flat records and group grants  |
//! | `guard`    | Session handling and redirects around the resolver      |

pub mod guard;
pub mod menu;
pub mod paths;
pub mod resolver;

pub use guard::{GuardOutcome, NavigationGuard, SessionState};
pub use menu::build_menu_tree;
pub use paths::{AllowedPathSet, extract_forest, extract_paths, normalize_path};
pub use resolver::{
    AccessDecision, AccessPolicy, DetailRule, MatchRule, PathAccessResolver, PrefixMode, is_allowed,
};
