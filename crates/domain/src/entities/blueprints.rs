//! Furniture factories used by level builders
//!
//! Each function returns an unregistered [`Entity`]; callers add it to a
//! world and place it.

use super::Entity;
use crate::capabilities::{Lockable, Openable};

pub fn table() -> Entity {
    Entity::container("table")
        .with_uniqueness(0.6)
        .with_prominence(0.8)
        .with_visibility(1.0)
}

/// Open compartments.
pub fn shelf() -> Entity {
    Entity::container("shelf")
        .with_uniqueness(0.5)
        .with_prominence(0.9)
        .with_visibility(0.9)
}

/// Closed, unlocked, opaque lid.
pub fn chest() -> Entity {
    Entity::container("chest")
        .with_uniqueness(0.5)
        .with_prominence(0.8)
        .with_visibility(0.8)
        .with_capability(Openable::new(false, 0.0))
        .with_capability(Lockable::new(false))
}

pub fn storage_box() -> Entity {
    Entity::container("box")
        .with_uniqueness(0.5)
        .with_prominence(0.8)
        .with_visibility(0.7)
}

/// Closed, unlocked, opaque doors.
pub fn cabinet() -> Entity {
    Entity::container("cabinet")
        .with_uniqueness(0.6)
        .with_prominence(0.9)
        .with_visibility(0.9)
        .with_capability(Openable::new(false, 0.0))
        .with_capability(Lockable::new(false))
}

pub fn wooden_table() -> Entity {
    table().with_material("oak wood").with_description(
        "A sturdy oak table with carved legs and a few burn marks from candles.",
    )
}

pub fn iron_table() -> Entity {
    table().with_material("forged iron").with_description(
        "An iron table with riveted joints, cold to the touch and faintly humming with resonance.",
    )
}

pub fn wooden_shelf() -> Entity {
    shelf().with_material("pine wood").with_description(
        "An open shelf of rough pine planks, filled with dust and faint smell of resin.",
    )
}

pub fn metal_shelf() -> Entity {
    shelf().with_material("steel").with_description(
        "A steel shelf with industrial precision, polished surfaces reflecting dim light.",
    )
}

/// Cardboard box whose lid lets some of the contents show through.
pub fn paper_box() -> Entity {
    storage_box()
        .with_material("cardboard")
        .with_description(
            "A plain cardboard box with slightly frayed edges. \
             The lid bends easily when pressed, and it carries faint marks from tape and labels.",
        )
        .with_uniqueness(0.4)
        .with_prominence(0.7)
        .with_visibility(1.0)
        .with_capability(Openable::new(false, 0.3))
}

pub fn wooden_chest() -> Entity {
    chest()
        .with_material("oak wood reinforced with iron bands")
        .with_description("An old chest with darkened oak panels and a heavy iron lockplate.")
}

pub fn iron_chest() -> Entity {
    chest()
        .with_material("forged iron")
        .with_description("A compact chest of black iron, its hinges groaning faintly when moved.")
}

pub fn wooden_cabinet() -> Entity {
    cabinet().with_material("varnished walnut").with_description(
        "A tall walnut cabinet with two panel doors, faint scent of polish and dust within.",
    )
}

pub fn iron_cabinet() -> Entity {
    cabinet().with_material("riveted iron").with_description(
        "A heavy iron cabinet, painted grey, its surface chipped and marked by years of use.",
    )
}
