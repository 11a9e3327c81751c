mod helpers;

use chrono::{Duration, Utc};
use helpers::OWNER;
use orbit::relationship::contacts::{
    contacts_needing_attention, get_contact, list_contacts, update_contact, ContactFilter,
    ContactPatch,
};
use orbit::relationship::types::{Frequency, Layer};

#[test]
fn weekly_contact_leaves_attention_list_after_a_call() {
    let mut conn = helpers::test_db();
    let sam = helpers::contact(&mut conn, "Sam Park", Layer::Inner, Frequency::Weekly);

    let before = contacts_needing_attention(&conn, OWNER, Utc::now()).unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].contact.id, sam.id);
    assert_eq!(before[0].effective_layer, Layer::Regular);

    helpers::call(&mut conn, &sam.id, None);

    let after = contacts_needing_attention(&conn, OWNER, Utc::now()).unwrap();
    assert!(after.is_empty());
    let view = get_contact(&conn, OWNER, &sam.id, Utc::now()).unwrap();
    assert_eq!(view.effective_layer, Layer::Inner);
    assert_eq!(view.days_since_contact, Some(0));
}

#[test]
fn threshold_is_four_fifths_of_the_target() {
    let mut conn = helpers::test_db();
    // monthly: 30 days, threshold 24
    let fresh = helpers::contact_last_seen(&mut conn, "Fresh", Layer::Regular, Frequency::Monthly, 23);
    let due = helpers::contact_last_seen(&mut conn, "Due", Layer::Regular, Frequency::Monthly, 24);

    let now = Utc::now();
    assert!(!get_contact(&conn, OWNER, &fresh.id, now).unwrap().needs_attention);
    assert!(get_contact(&conn, OWNER, &due.id, now).unwrap().needs_attention);
}

#[test]
fn attention_list_orders_never_contacted_then_most_overdue() {
    let mut conn = helpers::test_db();
    helpers::contact_last_seen(&mut conn, "Overdue A", Layer::Regular, Frequency::Weekly, 10);
    helpers::contact_last_seen(&mut conn, "Overdue B", Layer::Regular, Frequency::Weekly, 40);
    helpers::contact(&mut conn, "Never", Layer::Vip, Frequency::Yearly);
    helpers::contact_last_seen(&mut conn, "Fine", Layer::Regular, Frequency::Yearly, 10);

    let names: Vec<String> = contacts_needing_attention(&conn, OWNER, Utc::now())
        .unwrap()
        .into_iter()
        .map(|v| v.contact.name)
        .collect();
    assert_eq!(names, vec!["Never", "Overdue B", "Overdue A"]);
}

#[test]
fn changing_frequency_changes_attention() {
    let mut conn = helpers::test_db();
    let c = helpers::contact_last_seen(&mut conn, "Kim", Layer::Occasional, Frequency::Quarterly, 30);
    assert!(!get_contact(&conn, OWNER, &c.id, Utc::now()).unwrap().needs_attention);

    update_contact(
        &mut conn,
        OWNER,
        &c.id,
        &ContactPatch {
            contact_frequency: Some(Frequency::Weekly),
            ..Default::default()
        },
    )
    .unwrap();

    let view = get_contact(&conn, OWNER, &c.id, Utc::now()).unwrap();
    assert!(view.needs_attention);
    assert_eq!(view.effective_layer, Layer::Distant);
}

#[test]
fn backdated_conversation_cannot_rewind_last_contact() {
    let mut conn = helpers::test_db();
    let c = helpers::contact(&mut conn, "Lee", Layer::Inner, Frequency::Weekly);
    helpers::call(&mut conn, &c.id, None);
    helpers::call(&mut conn, &c.id, Some(Utc::now() - Duration::days(60)));

    assert!(!get_contact(&conn, OWNER, &c.id, Utc::now()).unwrap().needs_attention);
}

#[test]
fn owners_do_not_see_each_other() {
    let mut conn = helpers::test_db();
    helpers::contact(&mut conn, "Mine", Layer::Vip, Frequency::Weekly);

    let theirs = list_contacts(&conn, "someone-else", ContactFilter::default(), Utc::now()).unwrap();
    assert!(theirs.is_empty());
}
