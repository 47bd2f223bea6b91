//! Constellation - the set of ponds making up a scene, one of which is the
//! river new fish enter through.

use crate::components::Fish;
use crate::constraint::Constraint;
use crate::math::Vec2;

use super::pond::Pond;
use super::spawner::SpawnSite;

#[derive(Debug)]
pub struct Constellation<C: Constraint> {
    ponds: Vec<Pond<C>>,
    river: usize,
    pub spawn_point: Vec2,
    pub spawn_direction: Vec2,
}

impl<C: Constraint> Constellation<C> {
    /// `None` unless `river` indexes one of the ponds. A zero spawn
    /// direction becomes the default fish heading.
    pub fn new(
        ponds: Vec<Pond<C>>,
        river: usize,
        spawn_point: Vec2,
        spawn_direction: Vec2,
    ) -> Option<Self> {
        (river < ponds.len()).then(|| Self {
            ponds,
            river,
            spawn_point,
            spawn_direction: spawn_direction.normalize_or(Fish::DEFAULT_HEADING),
        })
    }

    pub fn ponds(&self) -> &[Pond<C>] {
        &self.ponds
    }

    pub fn ponds_mut(&mut self) -> &mut [Pond<C>] {
        &mut self.ponds
    }

    pub fn pond(&self, index: usize) -> Option<&Pond<C>> {
        self.ponds.get(index)
    }

    pub fn pond_mut(&mut self, index: usize) -> Option<&mut Pond<C>> {
        self.ponds.get_mut(index)
    }

    pub fn pond_count(&self) -> usize {
        self.ponds.len()
    }

    pub fn river_index(&self) -> usize {
        self.river
    }

    pub fn river(&self) -> &Pond<C> {
        &self.ponds[self.river]
    }

    pub fn river_mut(&mut self) -> &mut Pond<C> {
        &mut self.ponds[self.river]
    }

    /// Fish across all ponds.
    pub fn fish_count(&self) -> usize {
        self.ponds.iter().map(Pond::fish_count).sum()
    }

    pub fn spawn_site(&self) -> SpawnSite {
        SpawnSite {
            point: self.spawn_point,
            direction: self.spawn_direction,
            population: self.fish_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintCircle;
    use crate::testing::test_fish;

    fn constellation() -> Constellation<ConstraintCircle> {
        let ponds = vec![
            Pond::new(ConstraintCircle::new(Vec2::ZERO, 5.0)),
            Pond::new(ConstraintCircle::new(Vec2::new(20.0, 0.0), 3.0)),
        ];

        Constellation::new(ponds, 1, Vec2::new(18.0, 0.0), Vec2::new(2.0, 0.0)).unwrap()
    }

    #[test]
    fn test_river_must_exist() {
        assert!(Constellation::<ConstraintCircle>::new(Vec::new(), 0, Vec2::ZERO, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_zero_spawn_direction_falls_back() {
        let ponds = vec![Pond::new(ConstraintCircle::new(Vec2::ZERO, 5.0))];
        let constellation = Constellation::new(ponds, 0, Vec2::ZERO, Vec2::ZERO).unwrap();

        assert_eq!(constellation.spawn_site().direction, Fish::DEFAULT_HEADING);
    }

    #[test]
    fn test_fish_count_spans_ponds() {
        let mut constellation = constellation();
        constellation.pond_mut(0).unwrap().add_fish(test_fish(Vec2::ZERO));
        constellation.river_mut().add_fish(test_fish(Vec2::new(20.0, 0.0)));
        constellation.river_mut().add_fish(test_fish(Vec2::new(21.0, 0.0)));

        assert_eq!(constellation.fish_count(), 3);
        assert_eq!(constellation.river().fish_count(), 2);

        let site = constellation.spawn_site();
        assert_eq!(site.population, 3);
        assert_eq!(site.direction, Vec2::new(1.0, 0.0));
    }
}
