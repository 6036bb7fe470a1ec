//! Classic divide-and-conquer algorithms shipped with the catalog.

use tracing::info;

use recur_core::{Algorithm, AlgorithmCatalog, RecurResult, RecurrenceParams};

struct Builtin {
    name: &'static str,
    params: (i64, i64, i64),
    description: &'static str,
    code: &'static str,
    analysis: &'static str,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "Binary Search",
        params: (1, 2, 0),
        description: "Find a key in a sorted slice by halving the search range.",
        code: "\
fn binary_search(xs: &[i32], key: i32) -> Option<usize> {
    let (mut lo, mut hi) = (0, xs.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match xs[mid].cmp(&key) {
            Ordering::Equal => return Some(mid),
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
        }
    }
    None
}",
        analysis: "One subproblem of half the size plus constant work per level.",
    },
    Builtin {
        name: "Merge Sort",
        params: (2, 2, 1),
        description: "Sort by splitting in half, sorting each half, and merging.",
        code: "\
fn merge_sort(xs: &mut Vec<i32>) {
    if xs.len() <= 1 {
        return;
    }
    let mut right = xs.split_off(xs.len() / 2);
    merge_sort(xs);
    merge_sort(&mut right);
    *xs = merge(std::mem::take(xs), right);
}",
        analysis: "log n levels, each doing linear merge work.",
    },
    Builtin {
        name: "Karatsuba Multiplication",
        params: (3, 2, 1),
        description: "Multiply n-digit numbers with three half-size products instead of four.",
        code: "\
fn karatsuba(x: u128, y: u128, n: u32) -> u128 {
    if n <= 8 {
        return x * y;
    }
    let half = n / 2;
    let (x1, x0) = (x >> half, x & ((1 << half) - 1));
    let (y1, y0) = (y >> half, y & ((1 << half) - 1));
    let z2 = karatsuba(x1, y1, half);
    let z0 = karatsuba(x0, y0, half);
    let z1 = karatsuba(x1 + x0, y1 + y0, half + 1) - z2 - z0;
    (z2 << (2 * half)) + (z1 << half) + z0
}",
        analysis: "Leaf work dominates: three branches per level outgrow the linear combine.",
    },
    Builtin {
        name: "Strassen Matrix Multiplication",
        params: (7, 2, 2),
        description: "Multiply n x n matrices with seven half-size products.",
        code: "\
fn strassen(a: &Matrix, b: &Matrix) -> Matrix {
    if a.n() <= 64 {
        return a.naive_mul(b);
    }
    let (a11, a12, a21, a22) = a.quadrants();
    let (b11, b12, b21, b22) = b.quadrants();
    let m1 = strassen(&(&a11 + &a22), &(&b11 + &b22));
    // m2..m7 follow the same pattern
    Matrix::combine(m1, m2, m3, m4, m5, m6, m7)
}",
        analysis: "Seven recursive products beat the quadratic additions at every level.",
    },
    Builtin {
        name: "Tree Traversal",
        params: (2, 2, 0),
        description: "Visit every node of a balanced binary tree.",
        code: "\
fn visit(node: Option<&Node>, out: &mut Vec<i32>) {
    if let Some(n) = node {
        visit(n.left.as_deref(), out);
        out.push(n.value);
        visit(n.right.as_deref(), out);
    }
}",
        analysis: "Constant work per node over n nodes.",
    },
    Builtin {
        name: "Quickselect (ideal pivot)",
        params: (1, 2, 1),
        description: "Select the k-th smallest element, recursing into one half after a linear partition.",
        code: "\
fn select(xs: &mut [i32], k: usize) -> i32 {
    let p = partition(xs);
    match k.cmp(&p) {
        Ordering::Equal => xs[p],
        Ordering::Less => select(&mut xs[..p], k),
        Ordering::Greater => select(&mut xs[p + 1..], k - p - 1),
    }
}",
        analysis: "The first partition pass dominates: n + n/2 + n/4 + ... = O(n).",
    },
];

/// The builtin algorithms, classified.
pub fn builtin_algorithms() -> RecurResult<Vec<Algorithm>> {
    BUILTINS
        .iter()
        .map(|b| {
            let (a, base, k) = b.params;
            let params = RecurrenceParams::new(a, base, k)?;
            Ok(Algorithm::new(
                b.name.to_string(),
                params,
                b.description.to_string(),
                b.code.to_string(),
            )
            .with_analysis(b.analysis)
            .analyze())
        })
        .collect()
}

/// Insert any builtin algorithm not already in the catalog (matched by
/// name). Returns how many were inserted.
pub fn seed_builtin(catalog: &dyn AlgorithmCatalog) -> RecurResult<usize> {
    let mut inserted = 0;
    for algo in builtin_algorithms()? {
        if catalog.get_by_name(&algo.name)?.is_some() {
            continue;
        }
        catalog.add(algo)?;
        inserted += 1;
    }
    if inserted > 0 {
        info!("seeded {inserted} builtin algorithms");
    }
    Ok(inserted)
}
