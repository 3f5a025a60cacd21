//! Maximum-weight matching on general graphs.
//!
//! Implements the Galil O(n^3) blossom algorithm with dual variables, in the
//! formulation popularized by Joris van Rantwijk's reference implementation.
//! The interface is an edge list with integer weights; the result maps each
//! vertex index to its matched partner, or -1 when the vertex is unmatched.
//!
//! With `max_cardinality` set, the returned matching has maximum cardinality
//! first and maximum weight among those.
//!
//! ```
//! use matching::max_weight_matching;
//!
//! let mate = max_weight_matching(&[(0, 1, 4), (1, 2, 6), (2, 3, 4)], false);
//! assert_eq!(mate, vec![1, 0, 3, 2]);
//! ```

/// An undirected edge `(i, j, weight)` between two distinct vertices.
pub type Edge = (usize, usize, i64);

const NO_LABEL: i32 = 0;
const S_LABEL: i32 = 1;
const T_LABEL: i32 = 2;
const BREADCRUMB: i32 = 5;

/// Compute a maximum-weight matching over `edges`.
///
/// Vertices are the integers `0..n` where `n` is one past the largest index
/// appearing in the edge list. Returns `mate` with `mate[v]` = partner of
/// `v`, or `-1` if `v` is unmatched. Self-loops are not allowed.
pub fn max_weight_matching(edges: &[Edge], max_cardinality: bool) -> Vec<i64> {
    if edges.is_empty() {
        return Vec::new();
    }
    Matcher::new(edges, max_cardinality).solve()
}

/// All mutable state of one matching computation.
///
/// Vertices are `0..nvertex`; blossoms are `nvertex..2*nvertex`. Endpoint
/// `p` denotes vertex `edges[p / 2].{0 or 1}`; `p ^ 1` is the other side of
/// the same edge. Weights are doubled internally so every dual variable and
/// delta stays integral.
struct Matcher {
    nvertex: usize,
    max_cardinality: bool,
    edges: Vec<Edge>,
    endpoint: Vec<usize>,
    neighbend: Vec<Vec<usize>>,
    mate: Vec<i64>,
    label: Vec<i32>,
    labelend: Vec<i64>,
    inblossom: Vec<usize>,
    blossomparent: Vec<i64>,
    blossomchilds: Vec<Option<Vec<usize>>>,
    blossombase: Vec<i64>,
    blossomendps: Vec<Option<Vec<usize>>>,
    bestedge: Vec<i64>,
    blossombestedges: Vec<Option<Vec<usize>>>,
    unusedblossoms: Vec<usize>,
    dualvar: Vec<i64>,
    allowedge: Vec<bool>,
    queue: Vec<usize>,
}

impl Matcher {
    fn new(input: &[Edge], max_cardinality: bool) -> Self {
        let nedge = input.len();
        let mut nvertex = 0;
        // Double all weights; optimal duals for integer weights are
        // half-integral, so this keeps the arithmetic exact.
        let mut edges = Vec::with_capacity(nedge);
        for &(i, j, w) in input {
            assert!(i != j, "self-loop edge ({}, {})", i, j);
            nvertex = nvertex.max(i + 1).max(j + 1);
            edges.push((i, j, 2 * w));
        }

        let maxweight = edges.iter().map(|e| e.2).max().unwrap_or(0).max(0);

        let mut endpoint = Vec::with_capacity(2 * nedge);
        for p in 0..2 * nedge {
            let e = edges[p / 2];
            endpoint.push(if p % 2 == 0 { e.0 } else { e.1 });
        }

        let mut neighbend: Vec<Vec<usize>> = vec![Vec::new(); nvertex];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            neighbend[i].push(2 * k + 1);
            neighbend[j].push(2 * k);
        }

        let mut dualvar = vec![maxweight; nvertex];
        dualvar.extend(std::iter::repeat(0).take(nvertex));

        let mut blossombase: Vec<i64> = (0..nvertex as i64).collect();
        blossombase.extend(std::iter::repeat(-1).take(nvertex));

        Matcher {
            nvertex,
            max_cardinality,
            edges,
            endpoint,
            neighbend,
            mate: vec![-1; nvertex],
            label: vec![NO_LABEL; 2 * nvertex],
            labelend: vec![-1; 2 * nvertex],
            inblossom: (0..nvertex).collect(),
            blossomparent: vec![-1; 2 * nvertex],
            blossomchilds: vec![None; 2 * nvertex],
            blossombase,
            blossomendps: vec![None; 2 * nvertex],
            bestedge: vec![-1; 2 * nvertex],
            blossombestedges: vec![None; 2 * nvertex],
            unusedblossoms: (nvertex..2 * nvertex).collect(),
            dualvar,
            allowedge: vec![false; nedge],
            queue: Vec::new(),
        }
    }

    /// Slack of edge `k`: positive on non-tight edges, zero on tight ones.
    fn slack(&self, k: usize) -> i64 {
        let (i, j, wt) = self.edges[k];
        self.dualvar[i] + self.dualvar[j] - wt
    }

    /// All vertices contained in blossom `b`, depth first.
    fn blossom_leaves(&self, b: usize) -> Vec<usize> {
        if b < self.nvertex {
            return vec![b];
        }
        let mut leaves = Vec::new();
        let mut stack = vec![b];
        while let Some(t) = stack.pop() {
            if t < self.nvertex {
                leaves.push(t);
            } else {
                for &c in self.blossomchilds[t].as_ref().unwrap() {
                    stack.push(c);
                }
            }
        }
        leaves
    }

    /// Label the top-level blossom containing `w` as S (1) or T (2),
    /// reached through endpoint `p`. Labeling a T-blossom immediately
    /// labels its mate as S.
    fn assign_label(&mut self, w: usize, t: i32, p: i64) {
        let b = self.inblossom[w];
        debug_assert!(self.label[w] == NO_LABEL && self.label[b] == NO_LABEL);
        self.label[w] = t;
        self.label[b] = t;
        self.labelend[w] = p;
        self.labelend[b] = p;
        self.bestedge[w] = -1;
        self.bestedge[b] = -1;
        if t == S_LABEL {
            let leaves = self.blossom_leaves(b);
            self.queue.extend(leaves);
        } else if t == T_LABEL {
            let base = self.blossombase[b] as usize;
            let m = self.mate[base];
            debug_assert!(m >= 0);
            self.assign_label(self.endpoint[m as usize], S_LABEL, m ^ 1);
        }
    }

    /// Trace back from both ends of edge `(v, w)`; returns the base vertex
    /// of a new blossom, or -1 if an augmenting path was found instead.
    fn scan_blossom(&mut self, v: usize, w: usize) -> i64 {
        let mut path = Vec::new();
        let mut base: i64 = -1;
        let mut v: i64 = v as i64;
        let mut w: i64 = w as i64;
        while v != -1 || w != -1 {
            let b = self.inblossom[v as usize];
            if self.label[b] & 4 != 0 {
                base = self.blossombase[b];
                break;
            }
            debug_assert_eq!(self.label[b], S_LABEL);
            path.push(b);
            self.label[b] = BREADCRUMB;
            debug_assert_eq!(self.labelend[b], self.mate[self.blossombase[b] as usize]);
            if self.labelend[b] == -1 {
                // Base of blossom b is single; this path ends here.
                v = -1;
            } else {
                v = self.endpoint[self.labelend[b] as usize] as i64;
                let b = self.inblossom[v as usize];
                debug_assert_eq!(self.label[b], T_LABEL);
                debug_assert!(self.labelend[b] >= 0);
                v = self.endpoint[self.labelend[b] as usize] as i64;
            }
            if w != -1 {
                std::mem::swap(&mut v, &mut w);
            }
        }
        for b in path {
            self.label[b] = S_LABEL;
        }
        base
    }

    /// Construct a new blossom with base `base` through S-vertices connected
    /// by edge `k`, and make it the new top-level blossom of its vertices.
    fn add_blossom(&mut self, base: usize, k: usize) {
        let (mut v, mut w, _) = self.edges[k];
        let bb = self.inblossom[base];
        let mut bv = self.inblossom[v];
        let mut bw = self.inblossom[w];

        let b = self.unusedblossoms.pop().expect("ran out of blossom slots");
        self.blossombase[b] = base as i64;
        self.blossomparent[b] = -1;
        self.blossomparent[bb] = b as i64;

        let mut path = Vec::new();
        let mut endps = Vec::new();

        // Trace back from v to the base.
        while bv != bb {
            self.blossomparent[bv] = b as i64;
            path.push(bv);
            endps.push(self.labelend[bv] as usize);
            debug_assert!(self.labelend[bv] >= 0);
            v = self.endpoint[self.labelend[bv] as usize];
            bv = self.inblossom[v];
        }
        path.push(bb);
        path.reverse();
        endps.reverse();
        endps.push(2 * k);

        // Trace back from w to the base.
        while bw != bb {
            self.blossomparent[bw] = b as i64;
            path.push(bw);
            endps.push((self.labelend[bw] as usize) ^ 1);
            debug_assert!(self.labelend[bw] >= 0);
            w = self.endpoint[self.labelend[bw] as usize];
            bw = self.inblossom[w];
        }

        debug_assert_eq!(self.label[bb], S_LABEL);
        self.label[b] = S_LABEL;
        self.labelend[b] = self.labelend[bb];
        self.dualvar[b] = 0;

        self.blossomchilds[b] = Some(path);
        self.blossomendps[b] = Some(endps);

        // Relabel the vertices and queue former T-vertices.
        for v in self.blossom_leaves(b) {
            if self.label[self.inblossom[v]] == T_LABEL {
                self.queue.push(v);
            }
            self.inblossom[v] = b;
        }

        // Compute the blossom's least-slack edges to other S-blossoms.
        let mut bestedgeto: Vec<i64> = vec![-1; 2 * self.nvertex];
        let path = self.blossomchilds[b].clone().unwrap();
        for bv in path {
            let nblists: Vec<Vec<usize>> = match &self.blossombestedges[bv] {
                None => self
                    .blossom_leaves(bv)
                    .into_iter()
                    .map(|v| self.neighbend[v].iter().map(|p| p / 2).collect())
                    .collect(),
                Some(list) => vec![list.clone()],
            };
            for nblist in nblists {
                for k in nblist {
                    let (mut i, mut j, _) = self.edges[k];
                    if self.inblossom[j] == b {
                        std::mem::swap(&mut i, &mut j);
                    }
                    let bj = self.inblossom[j];
                    if bj != b
                        && self.label[bj] == S_LABEL
                        && (bestedgeto[bj] == -1
                            || self.slack(k) < self.slack(bestedgeto[bj] as usize))
                    {
                        bestedgeto[bj] = k as i64;
                    }
                }
            }
            self.blossombestedges[bv] = None;
            self.bestedge[bv] = -1;
        }
        let best: Vec<usize> = bestedgeto
            .into_iter()
            .filter(|&k| k != -1)
            .map(|k| k as usize)
            .collect();
        self.bestedge[b] = -1;
        for &k in &best {
            if self.bestedge[b] == -1 || self.slack(k) < self.slack(self.bestedge[b] as usize) {
                self.bestedge[b] = k as i64;
            }
        }
        self.blossombestedges[b] = Some(best);
    }

    /// Expand blossom `b`, turning its children into top-level blossoms.
    /// During a stage (`endstage == false`) a T-blossom's children must be
    /// relabeled along the alternating path through the blossom.
    fn expand_blossom(&mut self, b: usize, endstage: bool) {
        let childs = self.blossomchilds[b].clone().unwrap();
        for &s in &childs {
            self.blossomparent[s] = -1;
            if s < self.nvertex {
                self.inblossom[s] = s;
            } else if endstage && self.dualvar[s] == 0 {
                self.expand_blossom(s, endstage);
            } else {
                for v in self.blossom_leaves(s) {
                    self.inblossom[v] = s;
                }
            }
        }

        if !endstage && self.label[b] == T_LABEL {
            debug_assert!(self.labelend[b] >= 0);
            let entrychild = self.inblossom[self.endpoint[(self.labelend[b] as usize) ^ 1]];
            let len = childs.len() as i64;
            let wrap = |j: i64| -> usize { j.rem_euclid(len) as usize };
            let endps = self.blossomendps[b].clone().unwrap();

            let mut j = childs.iter().position(|&c| c == entrychild).unwrap() as i64;
            let (jstep, endptrick): (i64, i64) = if j % 2 == 1 {
                // Odd entry index: go forward and wrap around.
                j -= len;
                (1, 0)
            } else {
                // Even entry index: go backward.
                (-1, 1)
            };

            // Walk from the entry child down to the base, relabeling
            // alternate children as T and marking the connecting edges
            // allowable.
            let mut p = self.labelend[b];
            while j != 0 {
                self.label[self.endpoint[(p as usize) ^ 1]] = NO_LABEL;
                let q = endps[wrap(j - endptrick)] as i64 ^ endptrick ^ 1;
                self.label[self.endpoint[q as usize]] = NO_LABEL;
                self.assign_label(self.endpoint[(p as usize) ^ 1], T_LABEL, p);
                self.allowedge[endps[wrap(j - endptrick)] / 2] = true;
                j += jstep;
                p = (endps[wrap(j - endptrick)] as i64) ^ endptrick;
                self.allowedge[(p as usize) / 2] = true;
                j += jstep;
            }

            // Relabel the base child T without stepping through to its mate.
            let bv = childs[wrap(j)];
            self.label[self.endpoint[(p as usize) ^ 1]] = T_LABEL;
            self.label[bv] = T_LABEL;
            self.labelend[self.endpoint[(p as usize) ^ 1]] = p;
            self.labelend[bv] = p;
            self.bestedge[bv] = -1;

            // The remaining children keep no label unless one of their
            // vertices was reached from outside the expanding blossom.
            j += jstep;
            while childs[wrap(j)] != entrychild {
                let bv = childs[wrap(j)];
                if self.label[bv] == S_LABEL {
                    j += jstep;
                    continue;
                }
                let mut reached: i64 = -1;
                for v in self.blossom_leaves(bv) {
                    if self.label[v] != NO_LABEL {
                        reached = v as i64;
                        break;
                    }
                }
                if reached >= 0 {
                    let v = reached as usize;
                    debug_assert_eq!(self.label[v], T_LABEL);
                    debug_assert_eq!(self.inblossom[v], bv);
                    self.label[v] = NO_LABEL;
                    let base = self.blossombase[bv] as usize;
                    self.label[self.endpoint[self.mate[base] as usize]] = NO_LABEL;
                    let le = self.labelend[v];
                    self.assign_label(v, T_LABEL, le);
                }
                j += jstep;
            }
        }

        // Recycle the blossom slot.
        self.label[b] = -1;
        self.labelend[b] = -1;
        self.blossomchilds[b] = None;
        self.blossomendps[b] = None;
        self.blossombase[b] = -1;
        self.blossombestedges[b] = None;
        self.bestedge[b] = -1;
        self.unusedblossoms.push(b);
    }

    /// Swap matched and unmatched edges along the path around blossom `b`
    /// between vertex `v` and the blossom base, then rotate the child list
    /// so `v`'s child becomes the new base.
    fn augment_blossom(&mut self, b: usize, v: usize) {
        let mut t = v;
        while self.blossomparent[t] != b as i64 {
            t = self.blossomparent[t] as usize;
        }
        if t >= self.nvertex {
            self.augment_blossom(t, v);
        }

        let childs = self.blossomchilds[b].clone().unwrap();
        let endps = self.blossomendps[b].clone().unwrap();
        let len = childs.len() as i64;
        let wrap = |j: i64| -> usize { j.rem_euclid(len) as usize };

        let i = childs.iter().position(|&c| c == t).unwrap() as i64;
        let mut j = i;
        let (jstep, endptrick): (i64, i64) = if i % 2 == 1 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += jstep;
            let t = childs[wrap(j)];
            let p = (endps[wrap(j - endptrick)] as i64) ^ endptrick;
            if t >= self.nvertex {
                self.augment_blossom(t, self.endpoint[p as usize]);
            }
            j += jstep;
            let t = childs[wrap(j)];
            if t >= self.nvertex {
                self.augment_blossom(t, self.endpoint[(p as usize) ^ 1]);
            }
            self.mate[self.endpoint[p as usize]] = p ^ 1;
            self.mate[self.endpoint[(p as usize) ^ 1]] = p;
        }

        let i = i as usize;
        let mut rotated_childs = childs[i..].to_vec();
        rotated_childs.extend_from_slice(&childs[..i]);
        let mut rotated_endps = endps[i..].to_vec();
        rotated_endps.extend_from_slice(&endps[..i]);
        self.blossombase[b] = self.blossombase[rotated_childs[0]];
        self.blossomchilds[b] = Some(rotated_childs);
        self.blossomendps[b] = Some(rotated_endps);
        debug_assert_eq!(self.blossombase[b], v as i64);
    }

    /// Augment the matching along the alternating trees rooted at both ends
    /// of the tight edge `k`.
    fn augment_matching(&mut self, k: usize) {
        let (v, w, _) = self.edges[k];
        for (s0, p0) in [(v, (2 * k + 1) as i64), (w, (2 * k) as i64)] {
            let mut s = s0;
            let mut p = p0;
            loop {
                let bs = self.inblossom[s];
                debug_assert_eq!(self.label[bs], S_LABEL);
                debug_assert_eq!(self.labelend[bs], self.mate[self.blossombase[bs] as usize]);
                if bs >= self.nvertex {
                    self.augment_blossom(bs, s);
                }
                self.mate[s] = p;
                if self.labelend[bs] == -1 {
                    // Reached a single vertex; this tree is done.
                    break;
                }
                let t = self.endpoint[self.labelend[bs] as usize];
                let bt = self.inblossom[t];
                debug_assert_eq!(self.label[bt], T_LABEL);
                debug_assert!(self.labelend[bt] >= 0);
                s = self.endpoint[self.labelend[bt] as usize];
                let j = self.endpoint[(self.labelend[bt] as usize) ^ 1];
                debug_assert_eq!(self.blossombase[bt], t as i64);
                if bt >= self.nvertex {
                    self.augment_blossom(bt, j);
                }
                self.mate[j] = self.labelend[bt];
                p = self.labelend[bt] ^ 1;
            }
        }
    }

    fn solve(mut self) -> Vec<i64> {
        // Each stage finds one augmenting path and augments the matching.
        for _ in 0..self.nvertex {
            // Reset stage state.
            for l in self.label.iter_mut() {
                *l = NO_LABEL;
            }
            for e in self.bestedge.iter_mut() {
                *e = -1;
            }
            for be in self.blossombestedges[self.nvertex..].iter_mut() {
                *be = None;
            }
            for a in self.allowedge.iter_mut() {
                *a = false;
            }
            self.queue.clear();

            // Label all single top-level blossoms as S.
            for v in 0..self.nvertex {
                if self.mate[v] == -1 && self.label[self.inblossom[v]] == NO_LABEL {
                    self.assign_label(v, S_LABEL, -1);
                }
            }

            let mut augmented = false;
            loop {
                // Scan S-vertices until the queue runs dry or we augment.
                while let Some(v) = self.queue.pop() {
                    debug_assert_eq!(self.label[self.inblossom[v]], S_LABEL);
                    let neighbors = self.neighbend[v].clone();
                    for p in neighbors {
                        let k = p / 2;
                        let w = self.endpoint[p];
                        if self.inblossom[v] == self.inblossom[w] {
                            continue;
                        }
                        let mut kslack = 0;
                        if !self.allowedge[k] {
                            kslack = self.slack(k);
                            if kslack <= 0 {
                                self.allowedge[k] = true;
                            }
                        }
                        if self.allowedge[k] {
                            if self.label[self.inblossom[w]] == NO_LABEL {
                                // Free vertex: label it T (its mate becomes S).
                                self.assign_label(w, T_LABEL, (p as i64) ^ 1);
                            } else if self.label[self.inblossom[w]] == S_LABEL {
                                // S-to-S edge: new blossom or augmenting path.
                                let base = self.scan_blossom(v, w);
                                if base >= 0 {
                                    self.add_blossom(base as usize, k);
                                } else {
                                    self.augment_matching(k);
                                    augmented = true;
                                    break;
                                }
                            } else if self.label[w] == NO_LABEL {
                                // Vertex inside a T-blossom, not yet reached
                                // from outside; remember the reach for
                                // relabeling on expansion.
                                debug_assert_eq!(self.label[self.inblossom[w]], T_LABEL);
                                self.label[w] = T_LABEL;
                                self.labelend[w] = (p as i64) ^ 1;
                            }
                        } else if self.label[self.inblossom[w]] == S_LABEL {
                            let b = self.inblossom[v];
                            if self.bestedge[b] == -1
                                || kslack < self.slack(self.bestedge[b] as usize)
                            {
                                self.bestedge[b] = k as i64;
                            }
                        } else if self.label[w] == NO_LABEL
                            && (self.bestedge[w] == -1
                                || kslack < self.slack(self.bestedge[w] as usize))
                        {
                            self.bestedge[w] = k as i64;
                        }
                    }
                    if augmented {
                        break;
                    }
                }
                if augmented {
                    break;
                }

                // No augmenting path under the current duals; compute the
                // largest safe dual change.
                let mut deltatype = -1;
                let mut delta = 0i64;
                let mut deltaedge = 0usize;
                let mut deltablossom = 0usize;

                if !self.max_cardinality {
                    deltatype = 1;
                    delta = *self.dualvar[..self.nvertex].iter().min().unwrap();
                }
                for v in 0..self.nvertex {
                    if self.label[self.inblossom[v]] == NO_LABEL && self.bestedge[v] != -1 {
                        let d = self.slack(self.bestedge[v] as usize);
                        if deltatype == -1 || d < delta {
                            delta = d;
                            deltatype = 2;
                            deltaedge = self.bestedge[v] as usize;
                        }
                    }
                }
                for b in 0..2 * self.nvertex {
                    if self.blossomparent[b] == -1
                        && self.label[b] == S_LABEL
                        && self.bestedge[b] != -1
                    {
                        let d = self.slack(self.bestedge[b] as usize) / 2;
                        if deltatype == -1 || d < delta {
                            delta = d;
                            deltatype = 3;
                            deltaedge = self.bestedge[b] as usize;
                        }
                    }
                }
                for b in self.nvertex..2 * self.nvertex {
                    if self.blossombase[b] >= 0
                        && self.blossomparent[b] == -1
                        && self.label[b] == T_LABEL
                        && (deltatype == -1 || self.dualvar[b] < delta)
                    {
                        delta = self.dualvar[b];
                        deltatype = 4;
                        deltablossom = b;
                    }
                }
                if deltatype == -1 {
                    // All vertices matched under max-cardinality; saturate.
                    deltatype = 1;
                    delta = self.dualvar[..self.nvertex]
                        .iter()
                        .min()
                        .copied()
                        .unwrap()
                        .max(0);
                }

                // Apply the dual change.
                for v in 0..self.nvertex {
                    match self.label[self.inblossom[v]] {
                        S_LABEL => self.dualvar[v] -= delta,
                        T_LABEL => self.dualvar[v] += delta,
                        _ => {}
                    }
                }
                for b in self.nvertex..2 * self.nvertex {
                    if self.blossombase[b] >= 0 && self.blossomparent[b] == -1 {
                        match self.label[b] {
                            S_LABEL => self.dualvar[b] += delta,
                            T_LABEL => self.dualvar[b] -= delta,
                            _ => {}
                        }
                    }
                }

                match deltatype {
                    1 => break, // optimum reached
                    2 => {
                        self.allowedge[deltaedge] = true;
                        let (mut i, j, _) = self.edges[deltaedge];
                        if self.label[self.inblossom[i]] == NO_LABEL {
                            i = j;
                        }
                        debug_assert_eq!(self.label[self.inblossom[i]], S_LABEL);
                        self.queue.push(i);
                    }
                    3 => {
                        self.allowedge[deltaedge] = true;
                        let (i, _, _) = self.edges[deltaedge];
                        debug_assert_eq!(self.label[self.inblossom[i]], S_LABEL);
                        self.queue.push(i);
                    }
                    4 => self.expand_blossom(deltablossom, false),
                    _ => unreachable!(),
                }
            }

            if !augmented {
                break;
            }

            // End of stage: expand all S-blossoms with zero dual.
            for b in self.nvertex..2 * self.nvertex {
                if self.blossomparent[b] == -1
                    && self.blossombase[b] >= 0
                    && self.label[b] == S_LABEL
                    && self.dualvar[b] == 0
                {
                    self.expand_blossom(b, true);
                }
            }
        }

        // Convert mate endpoints to vertex indices.
        let mut mate = self.mate;
        for v in 0..self.nvertex {
            if mate[v] >= 0 {
                mate[v] = self.endpoint[mate[v] as usize] as i64;
            }
        }
        for v in 0..self.nvertex {
            debug_assert!(mate[v] == -1 || mate[mate[v] as usize] == v as i64);
        }
        mate
    }
}
