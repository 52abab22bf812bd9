//! Distance between convex hulls of finite point sets.
//!
//! The distance is computed with the Gilbert–Johnson–Keerthi (GJK) algorithm on the
//! Minkowski difference `A - B`. The closest point of the current working simplex to the
//! origin is found by projecting the origin onto the affine hull of every subset of the
//! simplex and keeping the best projection with non-negative barycentric weights. Since the
//! working simplex never has more than `D + 1` vertices, this is cheap for the small
//! dimensions we care about, and it works the same way in one, two and three dimensions.
use meshtree_traits::allocators::DimAllocator;
use meshtree_traits::Real;
use nalgebra::{DMatrix, DVector, DefaultAllocator, DimName, OPoint, OVector};
use numeric_literals::replace_float_literals;

/// Upper bound on GJK iterations. Polytopes converge in a handful of iterations, the bound
/// only guards against cycling caused by round-off.
const MAX_ITERATIONS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct ClosestPoints<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// The (non-negative) distance between the two convex hulls.
    pub distance: T,
    /// Point in the hull of the first point set closest to the second hull.
    pub point_a: OPoint<T, D>,
    /// Point in the hull of the second point set closest to the first hull.
    pub point_b: OPoint<T, D>,
}

#[derive(Debug, Clone)]
struct SupportVertex<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    index_a: usize,
    index_b: usize,
    /// `a[index_a] - b[index_b]`
    w: OVector<T, D>,
}

/// Closest point of a point set's convex hull to the origin, as a convex combination.
struct Projection<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    point: OVector<T, D>,
    /// Pairs of (index into the projected point set, barycentric weight).
    weights: Vec<(usize, T)>,
}

/// Computes the distance and a pair of closest points between the convex hulls of `a`
/// and `b`.
///
/// Returns `None` if either point set is empty. Intersecting hulls have distance zero, in
/// which case `point_a` and `point_b` coincide (up to round-off) at a common point.
#[replace_float_literals(T::from_f64(literal).unwrap())]
pub fn closest_points<T, D>(a: &[OPoint<T, D>], b: &[OPoint<T, D>]) -> Option<ClosestPoints<T, D>>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    let (first_a, first_b) = (a.first()?, b.first()?);

    // Relative thresholds for "v is zero" and "no support point improves on v"
    let zero_tolerance = 1e-24;
    let convergence_tolerance = 1e-12;

    let mut v = &first_a.coords - &first_b.coords;
    // Invariant: v is the closest point to the origin in the hull of the simplex
    let mut simplex = Vec::with_capacity(D::dim() + 2);
    simplex.push(SupportVertex {
        index_a: 0,
        index_b: 0,
        w: v.clone(),
    });
    let mut point_a = first_a.clone();
    let mut point_b = first_b.clone();
    let mut scale2 = v.norm_squared();

    for _ in 0..MAX_ITERATIONS {
        let v2 = v.norm_squared();
        if v2 <= zero_tolerance * scale2 {
            break;
        }

        let index_a = support_index(a, &(-&v));
        let index_b = support_index(b, &v);
        let w = &a[index_a].coords - &b[index_b].coords;
        scale2 = T::max(scale2, w.norm_squared());

        if v2 - v.dot(&w) <= convergence_tolerance * v2 {
            break;
        }
        if simplex
            .iter()
            .any(|vertex| vertex.index_a == index_a && vertex.index_b == index_b)
        {
            break;
        }

        let mut candidate = simplex.clone();
        candidate.push(SupportVertex { index_a, index_b, w });
        let points: Vec<_> = candidate.iter().map(|vertex| vertex.w.clone()).collect();
        let projection = project_origin_onto_hull(&points);

        // Round-off may prevent strict descent, at which point v is as good as it gets
        if projection.point.norm_squared() >= v2 {
            break;
        }

        let mut coords_a = OVector::<T, D>::zeros();
        let mut coords_b = OVector::<T, D>::zeros();
        simplex.clear();
        for &(i, weight) in &projection.weights {
            if weight > T::zero() {
                let vertex = &candidate[i];
                coords_a += &a[vertex.index_a].coords * weight;
                coords_b += &b[vertex.index_b].coords * weight;
                simplex.push(vertex.clone());
            }
        }
        point_a = OPoint::from(coords_a);
        point_b = OPoint::from(coords_b);
        v = projection.point;
    }

    Some(ClosestPoints {
        distance: v.norm(),
        point_a,
        point_b,
    })
}

/// Index of the point with the largest projection onto `direction`, lowest index on ties.
fn support_index<T, D>(points: &[OPoint<T, D>], direction: &OVector<T, D>) -> usize
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    let mut best_index = 0;
    let mut best_dot = points[0].coords.dot(direction);
    for (i, point) in points.iter().enumerate().skip(1) {
        let dot = point.coords.dot(direction);
        if dot > best_dot {
            best_index = i;
            best_dot = dot;
        }
    }
    best_index
}

fn project_origin_onto_hull<T, D>(points: &[OVector<T, D>]) -> Projection<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    let n = points.len();
    debug_assert!(n > 0 && n < usize::BITS as usize);

    let mut best: Option<Projection<T, D>> = None;
    for mask in 1..(1usize << n) {
        let subset: Vec<usize> = (0..n).filter(|&i| mask & (1 << i) != 0).collect();
        let Some(projection) = project_origin_onto_affine_hull(points, &subset) else {
            continue;
        };
        if projection.weights.iter().any(|&(_, weight)| weight < T::zero()) {
            continue;
        }
        let is_better = best
            .as_ref()
            .map(|current| projection.point.norm_squared() < current.point.norm_squared())
            .unwrap_or(true);
        if is_better {
            best = Some(projection);
        }
    }

    best.expect("Projection onto a single point always succeeds")
}

/// Projects the origin onto the affine hull of the selected points.
///
/// Returns `None` if the selected points are (nearly) affinely dependent. Such subsets
/// never need to be considered, since every point of their hull is also in the hull of a
/// smaller, affinely independent subset.
fn project_origin_onto_affine_hull<T, D>(points: &[OVector<T, D>], subset: &[usize]) -> Option<Projection<T, D>>
where
    T: Real,
    D: DimName,
    DefaultAllocator: DimAllocator<T, D>,
{
    let p0 = &points[subset[0]];
    let m = subset.len() - 1;
    if m == 0 {
        return Some(Projection {
            point: p0.clone(),
            weights: vec![(subset[0], T::one())],
        });
    }

    // Minimize |p0 + E mu|^2, i.e. solve the normal equations (E^T E) mu = -E^T p0
    let edges = DMatrix::from_fn(D::dim(), m, |r, c| points[subset[c + 1]][r] - p0[r]);
    let gram = edges.transpose() * &edges;

    let p0_dynamic = DVector::from_iterator(D::dim(), p0.iter().copied());
    let rhs = -(edges.transpose() * &p0_dynamic);
    let mu = solve_gram_system(gram, &rhs)?;
    let offset = &edges * &mu;
    let point = OVector::<T, D>::from_fn(|r, _| p0[r] + offset[r]);

    let mut weights = Vec::with_capacity(subset.len());
    weights.push((subset[0], T::one() - mu.sum()));
    weights.extend(subset[1..].iter().copied().zip(mu.iter().copied()));

    Some(Projection { point, weights })
}

/// Solves `G x = rhs` for a Gram matrix `G`, or returns `None` if `G` is (nearly) singular.
#[replace_float_literals(T::from_f64(literal).unwrap())]
fn solve_gram_system<T: Real>(gram: DMatrix<T>, rhs: &DVector<T>) -> Option<DVector<T>> {
    // The ratio det(G) / prod(G_ii) is scale invariant and vanishes for degenerate subsets
    let diagonal_product = gram.diagonal().iter().fold(T::one(), |acc, &g| acc * g);
    if diagonal_product <= T::zero() || gram.determinant() <= 1e-12 * diagonal_product {
        return None;
    }
    gram.lu().solve(rhs)
}
