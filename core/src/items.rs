use log::debug;

use crate::constants::*;
use crate::prng::RandomSource;
use crate::types::*;

/// Draw a uniformly random item for an item box.
pub fn roll_item<R: RandomSource>(rng: &mut R) -> ItemKind {
    ITEM_POOL[rng.index(ITEM_POOL.len())]
}

/// Whether a food item lures a given animal. Fish tempts both cats and penguins.
pub fn lures(item: ItemKind, animal: Animal) -> bool {
    matches!(
        (item, animal),
        (ItemKind::Carrot, Animal::Bunny)
            | (ItemKind::Fish, Animal::Kitten)
            | (ItemKind::Fish, Animal::Penguin)
            | (ItemKind::Bone, Animal::Puppy)
            | (ItemKind::Bread, Animal::Duckling)
            | (ItemKind::Bamboo, Animal::Panda)
    )
}

/// Closest racer strictly behind `user` (by total distance) and within `window`.
/// Equal distances go to the lower id.
pub fn nearest_trailing(racers: &[Racer], user: RacerId, window: f64) -> Option<RacerId> {
    let mine = racers[user].total_distance;
    racers
        .iter()
        .filter(|r| r.id != user)
        .filter(|r| r.total_distance < mine && mine - r.total_distance < window)
        .min_by(|a, b| b.total_distance.total_cmp(&a.total_distance))
        .map(|r| r.id)
}

/// Consume `user`'s held item and apply its effect.
///
/// - Boost / Star: 2 s of boost on the user
/// - Banana: spins out the nearest racer behind within `spin_window`
/// - Food: lures every other racer whose animal falls for it
pub fn use_item<R: RandomSource>(
    racers: &mut [Racer],
    user: RacerId,
    spin_window: f64,
    rng: &mut R,
) -> ItemOutcome {
    let Some(item) = racers[user].held_item.take() else {
        return ItemOutcome::Nothing;
    };
    debug!("racer {} used {:?}", user, item);

    match item {
        ItemKind::Boost | ItemKind::Star => {
            racers[user].boost_timer = BOOST_SECONDS;
            ItemOutcome::Boosted
        }
        ItemKind::Banana => match nearest_trailing(racers, user, spin_window) {
            Some(victim) => {
                racers[victim].spin_timer = SPIN_SECONDS;
                ItemOutcome::SpunOut(victim)
            }
            None => ItemOutcome::Missed,
        },
        food => {
            let mut lured = Vec::new();
            for r in racers.iter_mut() {
                if r.id == user || !lures(food, r.profile().animal) {
                    continue;
                }
                r.lured = true;
                r.lure_timer = LURE_SECONDS;
                r.lure_target_offset = rng.range(-LURE_TARGET_RANGE, LURE_TARGET_RANGE);
                lured.push(r.id);
            }
            if lured.is_empty() {
                ItemOutcome::Missed
            } else {
                ItemOutcome::Lured(lured)
            }
        }
    }
}
