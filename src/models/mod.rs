// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod nav;
pub mod profile;
pub mod session;
pub mod tournament;

pub use nav::NavItem;
pub use profile::{CreatePlayerProfile, Profile};
pub use session::{Session, User};
pub use tournament::{Category, Team, Tournament, Zone};
