//! Population matrix shared by every strategy.
//!
//! One contiguous row-major `f64` matrix. Each row is an agent; its block is
//! `[chromosome N][status 1][reward K]`. Two-phase layouts append a second
//! block of the same shape holding the incumbent ("old") copy.

use rand::Rng;

use crate::fitness::{Direction, Feasibility};
use crate::model::ChromosomeView;
use crate::pareto::sorting::{crowding_distance, non_dominated_sort, normalize};
use crate::random::HeurRng;

/// Column layout of a population row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub genes: usize,
    pub objectives: usize,
    pub two_phase: bool,
}

impl Layout {
    /// One block per row: `[genes][status][rewards]`.
    pub fn single(genes: usize, objectives: usize) -> Self {
        Self {
            genes,
            objectives,
            two_phase: false,
        }
    }

    /// A new block followed by an old block of the same width.
    pub fn two_phase(genes: usize, objectives: usize) -> Self {
        Self {
            genes,
            objectives,
            two_phase: true,
        }
    }

    /// Width of one block.
    pub fn block(&self) -> usize {
        self.genes + 1 + self.objectives
    }

    /// Width of one row.
    pub fn stride(&self) -> usize {
        if self.two_phase {
            2 * self.block()
        } else {
            self.block()
        }
    }

    fn offset(&self, region: Region) -> usize {
        match region {
            Region::Old if self.two_phase => self.block(),
            _ => 0,
        }
    }
}

/// Block of a row. Single-phase layouts alias `Old` to `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    New,
    Old,
}

/// Owned copy of one agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub chromosome: Vec<f64>,
    pub reward: Vec<f64>,
    pub status: Feasibility,
}

#[derive(Debug, Clone)]
pub struct Population {
    data: Vec<f64>,
    rows: usize,
    layout: Layout,
}

impl Population {
    /// Samples every chromosome uniformly from `[0, 1)` and sets rewards to
    /// the worst value of each direction.
    pub fn initialize(
        rows: usize,
        layout: Layout,
        directions: &[Direction],
        rng: &mut HeurRng,
    ) -> Self {
        debug_assert_eq!(directions.len(), layout.objectives);
        let mut data = vec![0.0; rows * layout.stride()];
        for row in data.chunks_mut(layout.stride()) {
            let (genes, rest) = row.split_at_mut(layout.genes);
            genes.iter_mut().for_each(|g| *g = rng.random());
            rest[0] = Feasibility::Infeasible.code();
            for (slot, d) in rest[1..=layout.objectives].iter_mut().zip(directions) {
                *slot = d.worst();
            }
        }
        let mut population = Self { data, rows, layout };
        population.swap_new_old();
        population
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn start(&self, row: usize, region: Region) -> usize {
        row * self.layout.stride() + self.layout.offset(region)
    }

    /// Full block of a row.
    pub fn block(&self, row: usize, region: Region) -> &[f64] {
        let start = self.start(row, region);
        &self.data[start..start + self.layout.block()]
    }

    /// Genes of a row, each in `[0, 1]` after [`clip`](Self::clip).
    pub fn chromosome(&self, row: usize, region: Region) -> &[f64] {
        let start = self.start(row, region);
        &self.data[start..start + self.layout.genes]
    }

    pub fn chromosome_mut(&mut self, row: usize, region: Region) -> &mut [f64] {
        let start = self.start(row, region);
        &mut self.data[start..start + self.layout.genes]
    }

    /// Feasibility written by the last evaluation of the block.
    pub fn status(&self, row: usize, region: Region) -> Feasibility {
        Feasibility::from_code(self.data[self.start(row, region) + self.layout.genes])
    }

    pub fn set_status(&mut self, row: usize, region: Region, status: Feasibility) {
        let index = self.start(row, region) + self.layout.genes;
        self.data[index] = status.code();
    }

    /// Penalized fitness, one slot per objective.
    pub fn reward(&self, row: usize, region: Region) -> &[f64] {
        let start = self.start(row, region) + self.layout.genes + 1;
        &self.data[start..start + self.layout.objectives]
    }

    pub fn reward_mut(&mut self, row: usize, region: Region) -> &mut [f64] {
        let start = self.start(row, region) + self.layout.genes + 1;
        &mut self.data[start..start + self.layout.objectives]
    }

    /// Copies the new block of every row into its old block.
    pub fn swap_new_old(&mut self) {
        for row in 0..self.rows {
            self.promote(row);
        }
    }

    /// Copies the new block of `row` into its old block.
    pub fn promote(&mut self, row: usize) {
        if !self.layout.two_phase {
            return;
        }
        let block = self.layout.block();
        let start = self.start(row, Region::New);
        self.data.copy_within(start..start + block, start + block);
    }

    /// Copies the `region` block of row `from` over row `to`.
    pub fn copy_row(&mut self, from: usize, to: usize, region: Region) {
        if from == to {
            return;
        }
        let block = self.layout.block();
        let src = self.start(from, region);
        let dst = self.start(to, region);
        self.data.copy_within(src..src + block, dst);
    }

    /// Clamps every gene of `region` into `[0, 1]`.
    pub fn clip(&mut self, region: Region) {
        for row in 0..self.rows {
            self.chromosome_mut(row, region)
                .iter_mut()
                .for_each(|g| *g = g.clamp(0.0, 1.0));
        }
    }

    /// Chromosomes of `region` as seen by the tracer.
    pub fn view(&self, region: Region) -> ChromosomeView<'_> {
        ChromosomeView::new(
            &self.data,
            self.rows,
            self.layout.stride(),
            self.layout.offset(region),
            self.layout.genes,
        )
    }

    /// Owned copy of one row.
    pub fn agent(&self, row: usize, region: Region) -> Agent {
        Agent {
            chromosome: self.chromosome(row, region).to_vec(),
            reward: self.reward(row, region).to_vec(),
            status: self.status(row, region),
        }
    }

    /// Reward `k` of every row.
    pub fn fitness_column(&self, region: Region, k: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.reward(row, region)[k]).collect()
    }

    /// Row indices ordered best first by the rewards of `region`.
    ///
    /// One objective: by fitness. Several: by non-dominated front, then by
    /// crowding distance, largest first.
    pub fn ranking(&self, region: Region, directions: &[Direction]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows).collect();
        if let [direction] = directions {
            order.sort_by(|&a, &b| {
                direction.compare(self.reward(a, region)[0], self.reward(b, region)[0])
            });
            return order;
        }

        let points = normalize((0..self.rows).map(|r| self.reward(r, region)), directions);
        let sorted = non_dominated_sort(&points);
        let mut crowding = vec![0.0; self.rows];
        for front in &sorted.fronts {
            let members: Vec<Vec<f64>> = front.iter().map(|&i| points[i].clone()).collect();
            for (&i, d) in front.iter().zip(crowding_distance(&members)) {
                crowding[i] = d;
            }
        }
        order.sort_by(|&a, &b| {
            sorted.rank[a]
                .cmp(&sorted.rank[b])
                .then_with(|| crowding[b].total_cmp(&crowding[a]))
        });
        order
    }

    /// Reorders whole rows best first.
    pub fn sort_best_first(&mut self, region: Region, directions: &[Direction]) {
        let order = self.ranking(region, directions);
        self.reorder(&order);
    }

    /// Rebuilds the matrix so that row `i` is a copy of old row `order[i]`.
    /// Indices may repeat.
    pub fn reorder(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.rows);
        let stride = self.layout.stride();
        let mut rebuilt = Vec::with_capacity(self.data.len());
        for &row in order {
            rebuilt.extend_from_slice(&self.data[row * stride..(row + 1) * stride]);
        }
        self.data = rebuilt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_initialize_layout() {
        let mut rng = create_rng(1);
        let layout = Layout::two_phase(3, 2);
        let dirs = [Direction::Minimize, Direction::Maximize];
        let pop = Population::initialize(4, layout, &dirs, &mut rng);

        assert_eq!(layout.stride(), 12);
        for row in 0..4 {
            assert!(pop.chromosome(row, Region::New).iter().all(|g| (0.0..1.0).contains(g)));
            assert_eq!(pop.reward(row, Region::New), &[f64::INFINITY, f64::NEG_INFINITY]);
            assert_eq!(pop.status(row, Region::New), Feasibility::Infeasible);
            assert_eq!(pop.block(row, Region::New), pop.block(row, Region::Old));
        }
    }

    #[test]
    fn test_promote_single_row() {
        let mut rng = create_rng(2);
        let mut pop =
            Population::initialize(2, Layout::two_phase(2, 1), &[Direction::Minimize], &mut rng);
        pop.chromosome_mut(1, Region::New).fill(0.25);
        pop.reward_mut(1, Region::New)[0] = 3.0;
        pop.promote(1);
        assert_eq!(pop.chromosome(1, Region::Old), &[0.25, 0.25]);
        assert_eq!(pop.reward(1, Region::Old), &[3.0]);
        assert_ne!(pop.chromosome(0, Region::Old), &[0.25, 0.25]);
    }

    #[test]
    fn test_single_phase_aliases_old() {
        let mut rng = create_rng(3);
        let mut pop =
            Population::initialize(1, Layout::single(2, 1), &[Direction::Minimize], &mut rng);
        pop.chromosome_mut(0, Region::Old).fill(0.5);
        assert_eq!(pop.chromosome(0, Region::New), &[0.5, 0.5]);
    }

    #[test]
    fn test_sort_single_objective() {
        let mut rng = create_rng(4);
        let mut pop =
            Population::initialize(3, Layout::single(1, 1), &[Direction::Maximize], &mut rng);
        for (row, r) in [1.0, 3.0, 2.0].into_iter().enumerate() {
            pop.reward_mut(row, Region::New)[0] = r;
            pop.chromosome_mut(row, Region::New)[0] = r / 10.0;
        }
        pop.sort_best_first(Region::New, &[Direction::Maximize]);
        assert_eq!(pop.fitness_column(Region::New, 0), vec![3.0, 2.0, 1.0]);
        assert_eq!(pop.chromosome(0, Region::New), &[0.3]);
    }

    #[test]
    fn test_sort_multi_objective() {
        let dirs = [Direction::Minimize, Direction::Minimize];
        let mut rng = create_rng(5);
        let mut pop = Population::initialize(3, Layout::single(1, 2), &dirs, &mut rng);
        pop.reward_mut(0, Region::New).copy_from_slice(&[4.0, 4.0]);
        pop.reward_mut(1, Region::New).copy_from_slice(&[1.0, 5.0]);
        pop.reward_mut(2, Region::New).copy_from_slice(&[5.0, 1.0]);
        assert_eq!(pop.ranking(Region::New, &dirs)[2], 0);
    }

    #[test]
    fn test_reorder_with_repeats() {
        let mut rng = create_rng(7);
        let mut pop =
            Population::initialize(3, Layout::single(1, 1), &[Direction::Minimize], &mut rng);
        for row in 0..3 {
            pop.chromosome_mut(row, Region::New)[0] = row as f64;
        }
        pop.reorder(&[2, 2, 0]);
        let genes: Vec<f64> = (0..3).map(|r| pop.chromosome(r, Region::New)[0]).collect();
        assert_eq!(genes, vec![2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_clip() {
        let mut rng = create_rng(6);
        let mut pop =
            Population::initialize(1, Layout::single(3, 1), &[Direction::Minimize], &mut rng);
        pop.chromosome_mut(0, Region::New)
            .copy_from_slice(&[-0.5, 0.5, 1.5]);
        pop.clip(Region::New);
        assert_eq!(pop.chromosome(0, Region::New), &[0.0, 0.5, 1.0]);
    }
}
