mod helpers;

use chrono::Utc;
use helpers::OWNER;
use orbit::relationship::layout::{seeded_angle, LayoutSubject, RingGeometry};
use orbit::relationship::relationship_map;
use orbit::relationship::types::{Frequency, Layer};
use orbit::relationship::view::RelationshipView;

fn ring_bounds(geometry: &RingGeometry, layer: Layer) -> (f64, f64) {
    (geometry.inner(layer), geometry.outer(layer))
}

#[test]
fn map_places_contacts_in_their_rings() {
    let mut conn = helpers::test_db();
    let geometry = RingGeometry::default();

    let steady = helpers::contact_last_seen(&mut conn, "Steady", Layer::Inner, Frequency::Monthly, 1);
    let drifting = helpers::contact(&mut conn, "Drifting", Layer::Inner, Frequency::Monthly);
    let far = helpers::contact(&mut conn, "Far", Layer::Distant, Frequency::Yearly);

    let nodes = relationship_map(&conn, OWNER, Utc::now(), &geometry).unwrap();
    assert_eq!(nodes.len(), 3);
    let node = |id: &str| nodes.iter().find(|n| n.contact_id == id).unwrap();

    let s = node(&steady.id);
    let (inner, outer) = ring_bounds(&geometry, Layer::Inner);
    assert!(!s.drifting);
    assert!(s.radius > inner && s.radius < outer, "{} not in ({inner}, {outer})", s.radius);
    assert_eq!(s.angle, seeded_angle(&steady.id));

    let d = node(&drifting.id);
    assert!(d.drifting);
    assert_eq!(d.nominal_layer, Layer::Inner);
    assert_eq!(d.effective_layer, Layer::Regular);
    assert_eq!(d.radius, geometry.outer(Layer::Regular));

    // Distant has nowhere further to go but is still pinned to the edge.
    let f = node(&far.id);
    assert!(f.drifting);
    assert_eq!(f.effective_layer, Layer::Distant);
    assert_eq!(f.radius, 400.0);
}

#[test]
fn coordinates_follow_angle_and_radius() {
    let mut conn = helpers::test_db();
    helpers::contact_last_seen(&mut conn, "A", Layer::Vip, Frequency::Weekly, 0);
    helpers::contact_last_seen(&mut conn, "B", Layer::Occasional, Frequency::Quarterly, 3);

    for n in relationship_map(&conn, OWNER, Utc::now(), &RingGeometry::default()).unwrap() {
        assert!((n.x - n.radius * n.angle.cos()).abs() < 1e-9);
        assert!((n.y - n.radius * n.angle.sin()).abs() < 1e-9);
        assert!((n.x.hypot(n.y) - n.radius).abs() < 1e-9);
    }
}

#[test]
fn dragged_position_keeps_angle_across_reconnect() {
    let mut conn = helpers::test_db();
    let c = helpers::contact(&mut conn, "Robin", Layer::Regular, Frequency::Weekly);

    let mut view = RelationshipView::new(RingGeometry::default());
    let angle = view.drag_to(&c.id, 0.0, 100.0);
    assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);

    let subjects = |conn: &rusqlite::Connection| {
        orbit::relationship::contacts::list_contacts(
            conn,
            OWNER,
            Default::default(),
            Utc::now(),
        )
        .unwrap()
        .iter()
        .map(LayoutSubject::from)
        .collect::<Vec<LayoutSubject>>()
    };

    let before = view.layout(&subjects(&conn));
    assert!(before[0].drifting);
    assert_eq!(before[0].angle, angle);

    helpers::call(&mut conn, &c.id, None);

    let after = view.layout(&subjects(&conn));
    assert!(!after[0].drifting);
    assert_eq!(after[0].angle, angle);
    assert!(after[0].radius < before[0].radius);
}
