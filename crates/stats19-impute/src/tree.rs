//! Depth-limited regression trees grown on binned gradients.

use crate::dataset::{BinnedMatrix, MISSING_BIN};

#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
    pub min_split_gain: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_leaf: 5,
            l2_regularization: 1.0,
            min_split_gain: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    /// Value bins up to and including this one go left.
    Threshold(u16),
    /// Only this level bin goes left.
    Category(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitNode {
    pub feature: usize,
    pub rule: SplitRule,
    pub missing_left: bool,
}

impl SplitNode {
    pub fn goes_left(&self, bin: u16) -> bool {
        if bin == MISSING_BIN {
            return self.missing_left;
        }
        match self.rule {
            SplitRule::Threshold(last) => bin <= last,
            SplitRule::Category(level) => bin == level,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(f64),
    Split {
        split: SplitNode,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, Default)]
struct GradSum {
    grad: f64,
    hess: f64,
    count: usize,
}

impl GradSum {
    fn add(&mut self, other: GradSum) {
        self.grad += other.grad;
        self.hess += other.hess;
        self.count += other.count;
    }

    fn minus(self, other: GradSum) -> GradSum {
        GradSum {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count - other.count,
        }
    }

    fn score(self, lambda: f64) -> f64 {
        self.grad * self.grad / (self.hess + lambda)
    }
}

struct Candidate {
    split: SplitNode,
    gain: f64,
}

/// Training inputs shared by every node of one tree.
pub struct GrowContext<'a> {
    pub binned: &'a BinnedMatrix,
    pub bin_counts: &'a [usize],
    pub categorical: &'a [bool],
    pub grad: &'a [f64],
    pub hess: &'a [f64],
    pub params: &'a TreeParams,
}

impl Tree {
    /// Grows a tree on `rows` minimising the second-order loss approximation.
    pub fn grow(ctx: &GrowContext<'_>, rows: Vec<usize>) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(ctx, rows, 0);
        tree
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf(_)))
            .count()
    }

    pub fn predict(&self, binned: &BinnedMatrix, row: usize) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split { split, left, right } => {
                    idx = if split.goes_left(binned.bin(row, split.feature)) {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn build(&mut self, ctx: &GrowContext<'_>, rows: Vec<usize>, depth: usize) -> usize {
        let idx = self.nodes.len();
        let total = sum_rows(ctx, &rows);
        let lambda = ctx.params.l2_regularization;
        self.nodes.push(Node::Leaf(-total.grad / (total.hess + lambda)));

        if depth >= ctx.params.max_depth || rows.len() < 2 * ctx.params.min_samples_leaf.max(1) {
            return idx;
        }
        let Some(best) = best_split(ctx, &rows, total) else {
            return idx;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| best.split.goes_left(ctx.binned.bin(row, best.split.feature)));
        let left = self.build(ctx, left_rows, depth + 1);
        let right = self.build(ctx, right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            split: best.split,
            left,
            right,
        };
        idx
    }
}

fn sum_rows(ctx: &GrowContext<'_>, rows: &[usize]) -> GradSum {
    let mut total = GradSum::default();
    for &row in rows {
        total.add(GradSum {
            grad: ctx.grad[row],
            hess: ctx.hess[row],
            count: 1,
        });
    }
    total
}

fn best_split(ctx: &GrowContext<'_>, rows: &[usize], total: GradSum) -> Option<Candidate> {
    let params = ctx.params;
    let parent = total.score(params.l2_regularization);
    let mut best: Option<Candidate> = None;

    let mut consider = |feature: usize, rule: SplitRule, left: GradSum, missing: GradSum| {
        for missing_left in [false, true] {
            let mut l = left;
            if missing_left {
                l.add(missing);
            }
            let r = total.minus(l);
            if l.count < params.min_samples_leaf || r.count < params.min_samples_leaf {
                continue;
            }
            let gain =
                l.score(params.l2_regularization) + r.score(params.l2_regularization) - parent;
            if gain > params.min_split_gain && best.as_ref().is_none_or(|b| gain > b.gain) {
                best = Some(Candidate {
                    split: SplitNode {
                        feature,
                        rule,
                        missing_left,
                    },
                    gain,
                });
            }
        }
    };

    for (feature, &bins) in ctx.bin_counts.iter().enumerate() {
        let mut hist = vec![GradSum::default(); bins];
        for &row in rows {
            let bin = usize::from(ctx.binned.bin(row, feature));
            hist[bin].add(GradSum {
                grad: ctx.grad[row],
                hess: ctx.hess[row],
                count: 1,
            });
        }
        let missing = hist[usize::from(MISSING_BIN)];

        if ctx.categorical[feature] {
            for (level, sum) in hist.iter().enumerate().skip(1) {
                if sum.count > 0 {
                    consider(feature, SplitRule::Category(level as u16), *sum, missing);
                }
            }
        } else {
            let mut left = GradSum::default();
            for (last, sum) in hist.iter().enumerate().skip(1).take(bins.saturating_sub(2)) {
                left.add(*sum);
                if sum.count > 0 {
                    consider(feature, SplitRule::Threshold(last as u16), left, missing);
                }
            }
        }
    }
    best
}
