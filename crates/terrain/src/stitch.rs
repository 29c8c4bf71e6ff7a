//! Orders raw boundary-segment soup into contour chains.
//!
//! Every unvisited segment seeds a chain that grows from both ends: a
//! backward walk prepends predecessors at the head, then a forward walk
//! appends successors at the tail. Candidates for each step come from the
//! index leaf around the open endpoint, so retracing a whole chunk stays
//! near-linear in its segment count.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::DEGENERATE_CHAIN_POINTS;
use crate::error::SurfaceError;
use crate::geom::{PointKey, Segment};
use crate::index::SegmentIndex;

/// One traced boundary path, usable directly as a polyline collider.
///
/// Closed chains wrap implicitly: the duplicate closing point is not
/// stored, so `points.first() != points.last()` even for loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourChain {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

/// Stitches one chunk's boundary soup into ordered chains.
///
/// Owns the visited table for a single pass; both the table and the index
/// are rebuilt per chunk regeneration and never shared across rebuilds.
pub struct ContourStitcher<'a> {
    segments: &'a [Segment],
    index: &'a SegmentIndex,
    visited: Vec<bool>,
}

impl<'a> ContourStitcher<'a> {
    pub fn new(segments: &'a [Segment], index: &'a SegmentIndex) -> Self {
        Self {
            segments,
            index,
            visited: vec![false; segments.len()],
        }
    }

    /// Trace every boundary exactly once, seeding in soup order.
    pub fn stitch(mut self) -> Result<Vec<ContourChain>, SurfaceError> {
        let mut chains = Vec::new();
        for seed in 0..self.segments.len() {
            if self.visited[seed] {
                continue;
            }
            self.visited[seed] = true;
            if let Some(chain) = self.trace(seed)? {
                chains.push(chain);
            }
        }
        Ok(chains)
    }

    fn trace(&mut self, seed: usize) -> Result<Option<ContourChain>, SurfaceError> {
        let seed_segment = self.segments[seed];
        let mut points = VecDeque::new();
        points.push_back(seed_segment.start);
        points.push_back(seed_segment.end);

        // Backward first: the head walk only ever starts directly from the
        // seed and takes precedence over the forward walk.
        let closed = self.walk(seed_segment, Direction::Backward, &mut points)?
            || self.walk(seed_segment, Direction::Forward, &mut points)?;

        if points.len() <= DEGENERATE_CHAIN_POINTS {
            trace!("dropping degenerate {}-point chain at seed {}", points.len(), seed);
            return Ok(None);
        }
        Ok(Some(ContourChain {
            points: points.into_iter().collect(),
            closed,
        }))
    }

    /// Grow the chain in one direction until the loop closes or no
    /// continuation exists. Returns whether the walk closed the loop.
    fn walk(
        &mut self,
        seed: Segment,
        direction: Direction,
        points: &mut VecDeque<Vec2>,
    ) -> Result<bool, SurfaceError> {
        let mut current = seed;
        let mut first_step = true;
        loop {
            let query = match direction {
                Direction::Backward => current.start,
                Direction::Forward => current.end,
            };
            let join = PointKey::of(query);
            let current_start = PointKey::of(current.start);

            let primary = self
                .index
                .leaf_at(query)
                .ok_or(SurfaceError::UncoveredQueryPoint { x: query.x, y: query.y })?;
            // The seed's two endpoints can fall in different leaves; widen
            // the very first step with the opposite endpoint's neighborhood.
            let extra = if first_step {
                let opposite = match direction {
                    Direction::Backward => seed.end,
                    Direction::Forward => seed.start,
                };
                Some(self.index.leaf_at(opposite).ok_or(SurfaceError::UncoveredQueryPoint {
                    x: opposite.x,
                    y: opposite.y,
                })?)
            } else {
                None
            };
            first_step = false;

            let mut selected = None;
            for entry in primary.iter().chain(extra.into_iter().flatten()) {
                let id = entry.id.0 as usize;
                if self.visited[id] {
                    continue;
                }
                let candidate = self.segments[id];
                // A candidate starting where the current edge starts is a
                // degenerate mirror of it, never a continuation.
                if PointKey::of(candidate.start) == current_start {
                    continue;
                }
                let connects = match direction {
                    Direction::Backward => PointKey::of(candidate.end) == join,
                    Direction::Forward => PointKey::of(candidate.start) == join,
                };
                if connects {
                    selected = Some((id, candidate));
                    break;
                }
            }

            // No continuation: the chain is open at this end, and the
            // trailing endpoint is already its terminal point.
            let Some((id, candidate)) = selected else {
                return Ok(false);
            };
            self.visited[id] = true;

            let far = match direction {
                Direction::Backward => candidate.start,
                Direction::Forward => candidate.end,
            };
            let terminal = match direction {
                Direction::Backward => points.back().copied(),
                Direction::Forward => points.front().copied(),
            };
            if terminal.map(PointKey::of) == Some(PointKey::of(far)) {
                // The candidate's far endpoint meets the chain's opposite
                // terminal: the loop closed. The closing duplicate is
                // suppressed, keeping first != last in the stored points.
                return Ok(true);
            }

            match direction {
                Direction::Backward => points.push_front(far),
                Direction::Forward => points.push_back(far),
            }
            current = candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Rect, SegmentId};

    fn seg(ax: f32, ay: f32, bx: f32, by: f32) -> Segment {
        Segment::new(Vec2::new(ax, ay), Vec2::new(bx, by))
    }

    fn build_index(segments: &[Segment], bounds: Rect) -> SegmentIndex {
        let mut index = SegmentIndex::new(bounds);
        for (i, segment) in segments.iter().enumerate() {
            index.insert(SegmentId(i as u32), segment.start);
        }
        index
    }

    fn run(segments: &[Segment]) -> Vec<ContourChain> {
        let bounds = Rect::new(Vec2::new(-16.0, -16.0), Vec2::splat(64.0));
        let index = build_index(segments, bounds);
        ContourStitcher::new(segments, &index)
            .stitch()
            .expect("test soup lies inside the index bounds")
    }

    #[test]
    fn test_unit_square_closes_from_any_seed() {
        let square = [
            seg(0.0, 0.0, 1.0, 0.0),
            seg(1.0, 0.0, 1.0, 1.0),
            seg(1.0, 1.0, 0.0, 1.0),
            seg(0.0, 1.0, 0.0, 0.0),
        ];
        for rotation in 0..4 {
            let mut soup = square.to_vec();
            soup.rotate_left(rotation);
            let chains = run(&soup);
            assert_eq!(chains.len(), 1, "seed rotation {rotation}");
            let chain = &chains[0];
            assert!(chain.closed);
            assert_eq!(chain.points.len(), 4);
            assert_ne!(chain.points.first(), chain.points.last());
        }
    }

    #[test]
    fn test_ring_stitches_to_one_closed_chain_per_segment_count() {
        // Perimeter of a 3x3 block: 12 unit segments, enough to subdivide
        // the index.
        let mut ring = Vec::new();
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(0.0, 3.0),
        ];
        for side in 0..4 {
            let from = corners[side];
            let to = corners[(side + 1) % 4];
            let step = (to - from) / 3.0;
            for i in 0..3 {
                ring.push(Segment::new(from + step * i as f32, from + step * (i + 1) as f32));
            }
        }
        for seed in 0..ring.len() {
            let mut soup = ring.clone();
            soup.rotate_left(seed);
            let chains = run(&soup);
            assert_eq!(chains.len(), 1, "seed {seed}");
            assert!(chains[0].closed, "seed {seed}");
            assert_eq!(chains[0].points.len(), 12, "seed {seed}");
            assert_ne!(chains[0].points.first(), chains[0].points.last());
        }
    }

    #[test]
    fn test_open_chain_keeps_both_dangling_ends() {
        let path = [
            seg(0.0, 0.0, 1.0, 0.0),
            seg(1.0, 0.0, 2.0, 0.0),
            seg(2.0, 0.0, 2.0, 1.0),
        ];
        // Seed from each position, including the middle, which must grow in
        // both directions.
        for rotation in 0..path.len() {
            let mut soup = path.to_vec();
            soup.rotate_left(rotation);
            let chains = run(&soup);
            assert_eq!(chains.len(), 1, "seed rotation {rotation}");
            let chain = &chains[0];
            assert!(!chain.closed);
            assert_eq!(chain.points.len(), 4);
            assert!(chain.points.contains(&Vec2::new(0.0, 0.0)));
            assert!(chain.points.contains(&Vec2::new(2.0, 1.0)));
        }
    }

    #[test]
    fn test_each_segment_used_at_most_once() {
        // Two disjoint unit squares.
        let soup = [
            seg(0.0, 0.0, 1.0, 0.0),
            seg(1.0, 0.0, 1.0, 1.0),
            seg(1.0, 1.0, 0.0, 1.0),
            seg(0.0, 1.0, 0.0, 0.0),
            seg(4.0, 4.0, 5.0, 4.0),
            seg(5.0, 4.0, 5.0, 5.0),
            seg(5.0, 5.0, 4.0, 5.0),
            seg(4.0, 5.0, 4.0, 4.0),
        ];
        let chains = run(&soup);
        assert_eq!(chains.len(), 2);
        let total_points: usize = chains.iter().map(|c| c.points.len()).sum();
        assert_eq!(total_points, 8);
        for chain in &chains {
            assert!(chain.closed);
        }
    }

    #[test]
    fn test_isolated_segment_is_discarded() {
        let chains = run(&[seg(0.0, 0.0, 1.0, 0.0)]);
        assert!(chains.is_empty());
    }

    #[test]
    fn test_two_segment_loop_is_degenerate() {
        let chains = run(&[seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 0.0, 0.0)]);
        assert!(chains.is_empty());
    }

    #[test]
    fn test_chain_follows_segment_direction() {
        let path = [
            seg(0.0, 0.0, 1.0, 0.0),
            seg(1.0, 0.0, 2.0, 0.0),
            seg(2.0, 0.0, 3.0, 0.0),
        ];
        let chains = run(&path);
        assert_eq!(chains.len(), 1);
        let expected = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
        ];
        assert_eq!(chains[0].points, expected);
    }

    #[test]
    fn test_soup_outside_index_bounds_is_fatal() {
        let soup = [seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 1.0, 1.0)];
        // Index deliberately built over bounds that miss the soup.
        let index = build_index(&soup, Rect::new(Vec2::new(10.0, 10.0), Vec2::splat(4.0)));
        let result = ContourStitcher::new(&soup, &index).stitch();
        assert!(matches!(result, Err(SurfaceError::UncoveredQueryPoint { .. })));
    }
}
