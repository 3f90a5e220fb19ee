// src/access.rs
//
// Motor de controle de acesso: decide o que cada cargo pode listar,
// criar, alterar, apagar e verificar. Não toca no banco.

pub mod capabilities;
pub mod engine;
pub mod filter;

pub use engine::{authorize_create, authorize_list, authorize_mutate, authorize_zone_listing, ZoneListingError};
pub use filter::{FilterError, ListHints, ScopeFilter};
