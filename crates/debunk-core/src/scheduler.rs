//! Post lifecycle scheduler.
//!
//! Active posts live in an arena keyed by [`PostId`], each carrying the
//! absolute session-clock time at which it is absorbed. There are no
//! per-post timers: a single [`PostScheduler::advance`] call walks every
//! occurrence that has come due (spawns and absorptions) in chronological
//! order. Removing a post from the arena is what cancels its absorption,
//! so a post can be absorbed at most once and never after a dismissal or a
//! [`clear`](PostScheduler::clear).

use std::collections::BTreeMap;

use debunk_types::{ActivePost, Engagement, PostId, PostStage, PostView};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::warn;

use crate::catalogue::PostCatalogue;
use crate::config::PostConfig;

/// Exclusive upper bound of the drawn reply count.
pub const COMMENTS_MAX: u32 = 50;
/// Exclusive upper bound of the drawn repost count.
pub const RETWEETS_MAX: u32 = 100;
/// Exclusive upper bound of the drawn like count.
pub const LIKES_MAX: u32 = 200;

/// Something the scheduler did during [`PostScheduler::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A post entered the arena.
    Spawned(ActivePost),
    /// A post reached its absorb time and left the arena.
    Absorbed(PostId),
}

/// The next due occurrence.
enum Due {
    Spawn(u64),
    Absorb(PostId),
}

/// Arena of active posts plus the spawn clock.
#[derive(Debug, Clone)]
pub struct PostScheduler {
    config: PostConfig,
    active: BTreeMap<PostId, ActivePost>,
    next_id: u64,
    next_spawn_at: Option<u64>,
}

impl PostScheduler {
    /// Empty, disarmed scheduler.
    ///
    /// A zero spawn interval is raised to 1 ms so [`advance`](Self::advance)
    /// always makes progress.
    pub const fn new(config: PostConfig) -> Self {
        let mut config = config;
        if config.spawn_interval_ms == 0 {
            config.spawn_interval_ms = 1;
        }
        Self {
            config,
            active: BTreeMap::new(),
            next_id: 0,
            next_spawn_at: None,
        }
    }

    /// Schedule the first spawn one interval after `now_ms`.
    pub const fn arm(&mut self, now_ms: u64) {
        self.next_spawn_at = Some(now_ms.saturating_add(self.config.spawn_interval_ms));
    }

    /// Whether spawning is scheduled.
    pub const fn is_armed(&self) -> bool {
        self.next_spawn_at.is_some()
    }

    /// Session-clock time of the next spawn, if armed.
    pub const fn next_spawn_at(&self) -> Option<u64> {
        self.next_spawn_at
    }

    /// Number of active posts.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether no post is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Look up an active post.
    pub fn get(&self, id: PostId) -> Option<&ActivePost> {
        self.active.get(&id)
    }

    /// Active posts in id (spawn) order.
    pub fn active(&self) -> impl Iterator<Item = &ActivePost> {
        self.active.values()
    }

    /// Process every spawn and absorption due at or before `now_ms`.
    ///
    /// Occurrences are handled in time order. An absorption due at the same
    /// instant as a spawn goes first. Spawns run at their scheduled time, not
    /// at `now_ms`, so a late tick does not stretch a post's lifetime.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        catalogue: &PostCatalogue,
        theme: &str,
        rng: &mut R,
    ) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        while let Some(due) = self.next_due(now_ms) {
            match due {
                Due::Absorb(id) => {
                    if self.active.remove(&id).is_some() {
                        events.push(SchedulerEvent::Absorbed(id));
                    }
                }
                Due::Spawn(at) => {
                    self.next_spawn_at = Some(at.saturating_add(self.config.spawn_interval_ms));
                    if self.active.len() >= self.config.max_active_posts {
                        continue;
                    }
                    if let Some(post) = self.spawn(at, catalogue, theme, rng) {
                        events.push(SchedulerEvent::Spawned(post));
                    }
                }
            }
        }
        events
    }

    /// Remove a post before it is absorbed. Returns whether it was active.
    pub fn dismiss(&mut self, id: PostId) -> bool {
        self.active.remove(&id).is_some()
    }

    /// Drop every active post and stop spawning.
    ///
    /// The id counter is kept, so ids stay unique across sessions.
    pub fn clear(&mut self) {
        self.active.clear();
        self.next_spawn_at = None;
    }

    /// Active posts with their stage and remaining lifetime at `now_ms`.
    pub fn views(&self, now_ms: u64) -> Vec<PostView> {
        let enter_delay = self.config.enter_delay_ms;
        self.active
            .values()
            .map(|post| {
                let stage = if now_ms < post.spawned_at_ms.saturating_add(enter_delay) {
                    PostStage::Entering
                } else {
                    PostStage::Approaching
                };
                PostView {
                    post: post.clone(),
                    stage,
                    remaining_ms: post.absorb_at_ms.saturating_sub(now_ms),
                }
            })
            .collect()
    }

    /// Draw the level increase for one absorption.
    pub fn draw_increase<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let low = self.config.increase_min;
        rng.random_range(low..=self.config.increase_max.max(low))
    }

    fn next_due(&self, now_ms: u64) -> Option<Due> {
        let absorb = self
            .active
            .values()
            .min_by_key(|post| (post.absorb_at_ms, post.id))
            .filter(|post| post.absorb_at_ms <= now_ms)
            .map(|post| (post.absorb_at_ms, post.id));
        let spawn = self.next_spawn_at.filter(|&at| at <= now_ms);

        match (absorb, spawn) {
            (Some((absorb_at, id)), Some(spawn_at)) if absorb_at <= spawn_at => {
                Some(Due::Absorb(id))
            }
            (_, Some(spawn_at)) => Some(Due::Spawn(spawn_at)),
            (Some((_, id)), None) => Some(Due::Absorb(id)),
            (None, None) => None,
        }
    }

    fn spawn<R: Rng + ?Sized>(
        &mut self,
        at: u64,
        catalogue: &PostCatalogue,
        theme: &str,
        rng: &mut R,
    ) -> Option<ActivePost> {
        let template = match catalogue.pick(theme, rng) {
            Ok(template) => template.clone(),
            Err(e) => {
                warn!(theme, error = %e, "Cannot spawn post, disarming scheduler");
                self.next_spawn_at = None;
                return None;
            }
        };

        let id = PostId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let post = ActivePost {
            id,
            template,
            vertical_slot: self.config.vertical_slots.choose(rng).copied().unwrap_or_default(),
            engagement: Engagement {
                likes: rng.random_range(0..LIKES_MAX),
                retweets: rng.random_range(0..RETWEETS_MAX),
                comments: rng.random_range(0..COMMENTS_MAX),
            },
            spawned_at_ms: at,
            absorb_at_ms: at.saturating_add(self.config.absorb_delay_ms),
        };
        self.active.insert(id, post.clone());
        Some(post)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    const CATALOGUE: &str = r##"{
        "flat_earth": [
            {"account_name": "Horizon Truth", "account_id": "@flat_horizon",
             "text_content": "Ever seen the curve yourself?", "hash_tags": ["#flatearth"]}
        ]
    }"##;

    fn setup() -> (PostScheduler, PostCatalogue, SmallRng) {
        let scheduler = PostScheduler::new(PostConfig::default());
        let catalogue = PostCatalogue::from_json(CATALOGUE).unwrap();
        (scheduler, catalogue, SmallRng::seed_from_u64(42))
    }

    fn spawned(events: &[SchedulerEvent]) -> Vec<PostId> {
        events
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::Spawned(post) => Some(post.id),
                SchedulerEvent::Absorbed(_) => None,
            })
            .collect()
    }

    fn absorbed(events: &[SchedulerEvent]) -> Vec<PostId> {
        events
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::Absorbed(id) => Some(*id),
                SchedulerEvent::Spawned(_) => None,
            })
            .collect()
    }

    #[test]
    fn disarmed_scheduler_does_nothing() {
        let (mut scheduler, catalogue, mut rng) = setup();
        let events = scheduler.advance(60_000, &catalogue, "flat_earth", &mut rng);
        assert!(events.is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn first_spawn_waits_one_interval() {
        let (mut scheduler, catalogue, mut rng) = setup();
        scheduler.arm(0);
        assert!(scheduler.advance(2_999, &catalogue, "flat_earth", &mut rng).is_empty());

        let events = scheduler.advance(3_000, &catalogue, "flat_earth", &mut rng);
        assert_eq!(spawned(&events), vec![PostId(0)]);
        let post = scheduler.get(PostId(0)).unwrap();
        assert_eq!(post.spawned_at_ms, 3_000);
        assert_eq!(post.absorb_at_ms, 7_000);
        assert_eq!(scheduler.next_spawn_at(), Some(6_000));
    }

    #[test]
    fn zero_interval_with_full_arena_still_returns() {
        let config = PostConfig {
            spawn_interval_ms: 0,
            max_active_posts: 1,
            ..PostConfig::default()
        };
        let mut scheduler = PostScheduler::new(config);
        let catalogue = PostCatalogue::from_json(CATALOGUE).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        scheduler.arm(0);

        let events = scheduler.advance(50, &catalogue, "flat_earth", &mut rng);
        assert_eq!(spawned(&events), vec![PostId(0)]);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_spawn_at(), Some(51));
    }

    #[test]
    fn spawned_post_has_bounded_counters_and_known_slot() {
        let (mut scheduler, catalogue, mut rng) = setup();
        scheduler.arm(0);
        let _ = scheduler.advance(30_000, &catalogue, "flat_earth", &mut rng);
        for post in scheduler.active() {
            assert!(post.engagement.comments < COMMENTS_MAX);
            assert!(post.engagement.retweets < RETWEETS_MAX);
            assert!(post.engagement.likes < LIKES_MAX);
            assert!(PostConfig::default().vertical_slots.contains(&post.vertical_slot));
        }
    }

    #[test]
    fn catch_up_runs_in_time_order() {
        let (mut scheduler, catalogue, mut rng) = setup();
        scheduler.arm(0);
        // Spawns at 3000, 6000, 9000; the first is absorbed at 7000.
        let events = scheduler.advance(9_000, &catalogue, "flat_earth", &mut rng);
        assert_eq!(
            events
                .iter()
                .map(|e| match e {
                    SchedulerEvent::Spawned(post) => ("spawn", post.id),
                    SchedulerEvent::Absorbed(id) => ("absorb", *id),
                })
                .collect::<Vec<_>>(),
            vec![
                ("spawn", PostId(0)),
                ("spawn", PostId(1)),
                ("absorb", PostId(0)),
                ("spawn", PostId(2)),
            ]
        );
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn each_post_is_absorbed_once() {
        let (mut scheduler, catalogue, mut rng) = setup();
        scheduler.arm(0);
        let _ = scheduler.advance(3_000, &catalogue, "flat_earth", &mut rng);
        let first = scheduler.advance(7_000, &catalogue, "flat_earth", &mut rng);
        assert_eq!(absorbed(&first), vec![PostId(0)]);

        let again = scheduler.advance(7_000, &catalogue, "flat_earth", &mut rng);
        assert!(absorbed(&again).is_empty());
        assert!(!scheduler.dismiss(PostId(0)));
    }

    #[test]
    fn dismiss_cancels_absorption() {
        let (mut scheduler, catalogue, mut rng) = setup();
        scheduler.arm(0);
        let _ = scheduler.advance(3_000, &catalogue, "flat_earth", &mut rng);
        assert!(scheduler.dismiss(PostId(0)));
        assert!(!scheduler.dismiss(PostId(0)));

        let events = scheduler.advance(7_500, &catalogue, "flat_earth", &mut rng);
        assert!(absorbed(&events).is_empty());
    }

    #[test]
    fn clear_disarms_and_keeps_ids_unique() {
        let (mut scheduler, catalogue, mut rng) = setup();
        scheduler.arm(0);
        let _ = scheduler.advance(6_000, &catalogue, "flat_earth", &mut rng);
        assert_eq!(scheduler.len(), 2);

        scheduler.clear();
        assert!(scheduler.is_empty());
        assert!(!scheduler.is_armed());
        assert!(scheduler.advance(60_000, &catalogue, "flat_earth", &mut rng).is_empty());

        scheduler.arm(60_000);
        let events = scheduler.advance(63_000, &catalogue, "flat_earth", &mut rng);
        assert_eq!(spawned(&events), vec![PostId(2)]);
    }

    #[test]
    fn spawns_skip_while_full() {
        let config = PostConfig {
            max_active_posts: 1,
            ..PostConfig::default()
        };
        let mut scheduler = PostScheduler::new(config);
        let catalogue = PostCatalogue::from_json(CATALOGUE).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        scheduler.arm(0);

        let events = scheduler.advance(6_000, &catalogue, "flat_earth", &mut rng);
        assert_eq!(spawned(&events), vec![PostId(0)]);
        assert_eq!(scheduler.next_spawn_at(), Some(9_000));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn unknown_theme_disarms() {
        let (mut scheduler, catalogue, mut rng) = setup();
        scheduler.arm(0);
        let events = scheduler.advance(10_000, &catalogue, "moon_landing", &mut rng);
        assert!(events.is_empty());
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn views_report_stage_and_remaining() {
        let (mut scheduler, catalogue, mut rng) = setup();
        scheduler.arm(0);
        let _ = scheduler.advance(3_000, &catalogue, "flat_earth", &mut rng);

        let entering = scheduler.views(3_050);
        assert_eq!(entering.len(), 1);
        assert_eq!(entering.first().map(|v| v.stage), Some(PostStage::Entering));
        assert_eq!(entering.first().map(|v| v.remaining_ms), Some(3_950));

        let approaching = scheduler.views(5_000);
        assert_eq!(approaching.first().map(|v| v.stage), Some(PostStage::Approaching));
        assert_eq!(approaching.first().map(|v| v.remaining_ms), Some(2_000));
    }

    #[test]
    fn increase_stays_in_configured_range() {
        let (scheduler, _, mut rng) = setup();
        for _ in 0..200 {
            let increase = scheduler.draw_increase(&mut rng);
            assert!((1..=3).contains(&increase));
        }
    }
}
