//! Tag commands.

use super::{print_json, StoreOptions};
use serde::Serialize;

/// A tag and how many documents carry it.
#[derive(Debug, Serialize)]
pub struct TagRow {
    /// Tag name.
    pub name: String,
    /// Glyph.
    pub glyph: String,
    /// Documents carrying the tag.
    pub documents: usize,
}

/// Lists an owner's tag vocabulary.
pub fn list(
    options: &StoreOptions,
    owner: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let rows: Vec<TagRow> = store
        .with_owner(owner, |owner| {
            owner
                .tag_vocabulary()
                .into_iter()
                .map(|(name, glyph)| TagRow {
                    documents: owner.get_by_tag(&name).len(),
                    name,
                    glyph,
                })
                .collect()
        })
        .unwrap_or_default();

    match format {
        "json" => print_json(&rows)?,
        _ => {
            for row in &rows {
                println!("{} {:<20} {} documents", row.glyph, row.name, row.documents);
            }
        }
    }
    Ok(())
}

/// Declares a tag.
pub fn create(
    options: &StoreOptions,
    owner: &str,
    name: &str,
    glyph: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    if store.create_tag(owner, name, glyph)? {
        println!("✓ Created tag {glyph} {name}");
    } else {
        println!("✓ Updated tag {glyph} {name}");
    }
    Ok(())
}

/// Removes a tag from the owner and every document.
pub fn delete(
    options: &StoreOptions,
    owner: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let affected = store.delete_tag(owner, name)?;
    println!("✓ Deleted tag {name} ({} documents untagged)", affected.len());
    Ok(())
}

/// Tags a document.
pub fn add(
    options: &StoreOptions,
    owner: &str,
    id: &str,
    tag: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    if store.tag_document(owner, id, tag)? {
        println!("✓ Tagged {id} with {tag}");
    } else {
        println!("{id} already tagged with {tag}");
    }
    Ok(())
}

/// Removes a tag from a document.
pub fn remove(
    options: &StoreOptions,
    owner: &str,
    id: &str,
    tag: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    if store.untag_document(owner, id, tag)? {
        println!("✓ Removed {tag} from {id}");
    } else {
        println!("{id} was not tagged with {tag}");
    }
    Ok(())
}
