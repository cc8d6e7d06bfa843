//! fontdb queries that turn a family name into loaded [`FontData`].

use fontdb::{Database, Family, Query, Stretch, Style, Weight};

use super::types::FontData;

/// Load the best match for `family` at the given weight.
pub(crate) fn load_font_from_db(db: &Database, family: &str, weight: Weight) -> Option<FontData> {
    load_family(db, Family::Name(family), weight)
}

/// Load the generic monospace family at the given weight.
pub(crate) fn load_generic_monospace(db: &Database, weight: Weight) -> Option<FontData> {
    load_family(db, Family::Monospace, weight)
}

fn load_family(db: &Database, family: Family<'_>, weight: Weight) -> Option<FontData> {
    let families = [family];
    let query = Query {
        families: &families,
        weight,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = db.query(&query)?;
    let (data, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
    FontData::new_with_index(data, index as usize)
}
