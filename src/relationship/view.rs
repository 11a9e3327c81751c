//! Ephemeral view state: drag overrides and dismissed opportunities.
//!
//! Nothing here is persisted. A [`RelationshipView`] lives as long as the
//! session that owns it and is dropped with it.

use std::collections::HashSet;
use std::f64::consts::TAU;

use super::layout::{layout_with, AngleOverrides, LayoutNode, LayoutSubject, RingGeometry};
use super::types::OpportunityView;

#[derive(Debug, Clone, Default)]
pub struct RelationshipView {
    geometry: RingGeometry,
    overrides: AngleOverrides,
    dismissed: HashSet<String>,
}

impl RelationshipView {
    pub fn new(geometry: RingGeometry) -> Self {
        Self {
            geometry,
            overrides: AngleOverrides::new(),
            dismissed: HashSet::new(),
        }
    }

    /// Record that a contact was dragged to `(x, y)` relative to the centre.
    /// Only the angle is kept; radius keeps following attention state.
    pub fn drag_to(&mut self, contact_id: &str, x: f64, y: f64) -> f64 {
        let angle = y.atan2(x).rem_euclid(TAU);
        self.overrides.insert(contact_id.to_string(), angle);
        angle
    }

    pub fn clear_override(&mut self, contact_id: &str) -> bool {
        self.overrides.remove(contact_id).is_some()
    }

    pub fn overrides(&self) -> &AngleOverrides {
        &self.overrides
    }

    pub fn layout(&self, subjects: &[LayoutSubject]) -> Vec<LayoutNode> {
        layout_with(subjects, &self.overrides, &self.geometry)
    }

    /// Hide an opportunity for the rest of this session.
    pub fn dismiss(&mut self, opportunity_id: &str) {
        self.dismissed.insert(opportunity_id.to_string());
    }

    pub fn is_dismissed(&self, opportunity_id: &str) -> bool {
        self.dismissed.contains(opportunity_id)
    }

    /// Opportunities not dismissed in this session.
    pub fn visible_opportunities<'a>(
        &self,
        opportunities: &'a [OpportunityView],
    ) -> Vec<&'a OpportunityView> {
        opportunities
            .iter()
            .filter(|o| !self.is_dismissed(&o.opportunity.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::layout::seeded_angle;
    use crate::relationship::types::{Layer, Opportunity, OpportunityKind, Priority};
    use std::f64::consts::FRAC_PI_2;

    fn subject(id: &str, needs_attention: bool) -> LayoutSubject {
        LayoutSubject {
            contact_id: id.into(),
            layer: Layer::Regular,
            needs_attention,
        }
    }

    fn opportunity(id: &str) -> OpportunityView {
        OpportunityView {
            opportunity: Opportunity {
                id: id.into(),
                owner_id: "me".into(),
                contact_id: "c1".into(),
                kind: OpportunityKind::FollowUp,
                title: "Send the photos".into(),
                description: None,
                due_date: None,
                priority: Priority::Medium,
                suggested_message: None,
                completed_at: None,
                created_at: chrono::Utc::now(),
            },
            contact_name: "Sam".into(),
            contact_layer: Layer::Regular,
        }
    }

    #[test]
    fn drag_sets_angle_in_full_turn_range() {
        let mut view = RelationshipView::default();
        assert!((view.drag_to("a", 0.0, 10.0) - FRAC_PI_2).abs() < 1e-12);
        // Below the x axis atan2 is negative; stored angle is wrapped.
        let angle = view.drag_to("a", 0.0, -10.0);
        assert!((angle - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert_eq!(view.overrides().get("a"), Some(&angle));
    }

    #[test]
    fn dragged_angle_survives_attention_change() {
        let mut view = RelationshipView::default();
        let angle = view.drag_to("a", -5.0, 5.0);

        let settled = &view.layout(&[subject("a", false)])[0];
        let drifting = &view.layout(&[subject("a", true)])[0];

        assert_eq!(settled.angle, angle);
        assert_eq!(drifting.angle, angle);
        assert_eq!(drifting.radius, 320.0);
        assert!(settled.radius < drifting.radius);
    }

    #[test]
    fn clearing_override_restores_seeded_angle() {
        let mut view = RelationshipView::default();
        view.drag_to("a", 1.0, 1.0);
        assert!(view.clear_override("a"));
        assert!(!view.clear_override("a"));
        assert_eq!(view.layout(&[subject("a", false)])[0].angle, seeded_angle("a"));
    }

    #[test]
    fn dismissed_ids_are_tracked_locally() {
        let mut view = RelationshipView::default();
        assert!(!view.is_dismissed("opp-1"));
        view.dismiss("opp-1");
        assert!(view.is_dismissed("opp-1"));
        assert!(!view.is_dismissed("opp-2"));

        let listed: Vec<OpportunityView> = ["opp-1", "opp-2"].into_iter().map(opportunity).collect();
        let visible: Vec<&str> = view
            .visible_opportunities(&listed)
            .into_iter()
            .map(|o| o.opportunity.id.as_str())
            .collect();
        assert_eq!(visible, vec!["opp-2"]);
    }
}
