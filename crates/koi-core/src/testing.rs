//! Fixtures shared by unit tests.

use crate::components::{Body, Fins, Fish, Genes, Layer, PaletteSample, Pattern, ShapeBody, Tail};
use crate::math::Vec2;

/// Plain newborn fish, one unit long when grown, quick to court.
pub fn test_fish(position: Vec2) -> Fish {
    let body = Body {
        length: 100,
        radius: 120,
        fins: Fins { length: 50 },
        tail: Tail {
            length: 130,
            skin: 110,
        },
        pattern: Pattern::new(
            PaletteSample { x: 4, y: 10 },
            ShapeBody {
                center_power: 230,
                radius_power: 130,
                rear_power: 155,
            },
            75,
            vec![Layer::Spots {
                palette: PaletteSample { x: 7, y: 7 },
                scale: 80,
                stretch: 128,
                threshold: 90,
                x: 130,
                y: 125,
                roughness: 40,
            }],
        ),
    };
    let genes = Genes {
        growth_speed: 180,
        mating_frequency: 250,
        offspring_count: 5,
        lifetime: 30000,
    };

    Fish::new(body, genes, position, Vec2::new(1.0, 0.0))
}
