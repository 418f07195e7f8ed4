// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Header navigation built from the tournament hierarchy.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::tournament::Tournament;

/// Id of the main-menu entry that receives the tournament sub-menu.
pub const TOURNAMENTS_MENU_ID: &str = "torneos";

const MAIN_MENU: [(&str, &str); 6] = [
    ("inicio", "/"),
    (TOURNAMENTS_MENU_ID, "/torneos"),
    ("amistosos", "/amistosos"),
    ("galeria", "/galeria"),
    ("contacto", "/contacto"),
    ("inscripciones", "/inscripciones"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NavItem {
    pub id: String,
    pub name: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_menu: Option<Vec<NavItem>>,
}

impl NavItem {
    fn leaf(id: &str, name: &str, href: String) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            href,
            sub_menu: None,
        }
    }
}

/// Project tournaments into navigation entries.
///
/// Hidden nodes are dropped together with everything below them.
pub fn tournaments_to_nav_items(tournaments: &[Tournament]) -> Vec<NavItem> {
    tournaments
        .iter()
        .filter(|t| !t.hidden)
        .map(|tournament| NavItem {
            id: tournament.id.clone(),
            name: tournament.name.clone(),
            href: format!("/torneos/{}", tournament.slug),
            sub_menu: Some(
                tournament
                    .visible_categories()
                    .map(|category| NavItem {
                        id: category.id.clone(),
                        name: category.name.clone(),
                        href: format!("/torneos/{}/{}", tournament.slug, category.slug),
                        sub_menu: Some(
                            category
                                .visible_zones()
                                .map(|zone| {
                                    NavItem::leaf(
                                        &zone.id,
                                        &zone.name,
                                        format!(
                                            "/torneos/{}/{}/{}",
                                            tournament.slug, category.slug, zone.slug
                                        ),
                                    )
                                })
                                .collect(),
                        ),
                    })
                    .collect(),
            ),
        })
        .collect()
}

/// Header menu with the tournament entries under `torneos`.
pub fn main_menu(tournaments: &[Tournament]) -> Vec<NavItem> {
    MAIN_MENU
        .iter()
        .map(|(id, href)| {
            let mut item = NavItem::leaf(id, id, href.to_string());
            if *id == TOURNAMENTS_MENU_ID {
                item.sub_menu = Some(tournaments_to_nav_items(tournaments));
            }
            item
        })
        .collect()
}
