use setsim_lsh::{Index, Sketch};

fn main() {
    // Toy string-valued sets (e.g., two table columns' distinct values):
    let a = ["k1", "k2", "k3", "shared-1", "shared-2", "shared-3", "x", "y"];
    let b = ["k1", "k2", "k4", "shared-1", "shared-2", "shared-3", "x", "z"];

    let k = 128;
    let mut sig_a = Sketch::new(k).unwrap();
    for v in &a {
        sig_a.update(v.as_bytes());
    }

    let mut sig_b = Sketch::new(k).unwrap();
    for v in &b {
        sig_b.update(v.as_bytes());
    }

    // 32 bands x 4 rows = 128, tuned for a threshold of 0.5.
    let mut index = Index::<u32>::from_threshold(0.5, k as u32).unwrap();
    index.insert(0, &sig_a).unwrap();
    index.insert(1, &sig_b).unwrap();

    let candidates = index.query(&sig_a).unwrap();
    println!("Candidates for A: {candidates:?}");

    let j = sig_a.estimate_jaccard(&sig_b).unwrap();
    println!("Estimated Jaccard(A,B): {j:.3}");
}
