pub mod attention;
pub mod contacts;
pub mod conversations;
pub mod drift;
pub mod layout;
pub mod opportunities;
pub mod rows;
pub mod stats;
pub mod transfer;
pub mod types;
pub mod view;

use chrono::{DateTime, Utc};

use layout::{LayoutNode, LayoutSubject, RingGeometry};
use types::ContactView;

/// Lay out already-loaded contact views with the given ring geometry.
pub fn layout_contacts(views: &[ContactView], geometry: &RingGeometry) -> Vec<LayoutNode> {
    let subjects: Vec<LayoutSubject> = views.iter().map(LayoutSubject::from).collect();
    layout::layout_with(&subjects, &layout::AngleOverrides::new(), geometry)
}

/// Load an owner's contacts and lay them out as of `now`.
pub fn relationship_map(
    conn: &rusqlite::Connection,
    owner: &str,
    now: DateTime<Utc>,
    geometry: &RingGeometry,
) -> anyhow::Result<Vec<LayoutNode>> {
    let views = contacts::list_contacts(conn, owner, contacts::ContactFilter::default(), now)?;
    Ok(layout_contacts(&views, geometry))
}
