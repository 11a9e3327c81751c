//! Layer drift: contacts that need attention are shown one ring further out.

use super::types::Layer;

/// Display layer for a contact. Saturates at [`Layer::Distant`].
pub fn effective_layer(nominal: Layer, needs_attention: bool) -> Layer {
    if needs_attention {
        nominal.outward().unwrap_or(nominal)
    } else {
        nominal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drifts_one_ring_outward() {
        assert_eq!(effective_layer(Layer::Vip, true), Layer::Inner);
        assert_eq!(effective_layer(Layer::Inner, true), Layer::Regular);
        assert_eq!(effective_layer(Layer::Regular, true), Layer::Occasional);
        assert_eq!(effective_layer(Layer::Occasional, true), Layer::Distant);
    }

    #[test]
    fn distant_saturates() {
        assert_eq!(effective_layer(Layer::Distant, true), Layer::Distant);
    }

    #[test]
    fn no_drift_without_attention() {
        for layer in Layer::ALL {
            assert_eq!(effective_layer(layer, false), layer);
        }
    }
}
