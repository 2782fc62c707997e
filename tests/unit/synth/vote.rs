use super::*;

fn identity(w: u32, h: u32) -> Nnf {
    let field = (0..h as i32)
        .flat_map(|y| (0..w as i32).map(move |x| [x, y]))
        .collect();
    Nnf::from_field(w, h, field)
}

#[test]
fn identity_field_reproduces_source() {
    let data: Vec<u8> = (0..48).map(|v| (v * 5) as u8).collect();
    let src = CompactImage::new(4, 4, 3, data).unwrap();
    let nnf = identity(4, 4);
    let out = vote_cpu(&VoteInput {
        source_style: &src,
        nnf: &nnf,
        errors: None,
        patch_size: 3,
        mode: VoteMode::Plain,
    });
    assert_eq!(out, src);
}

#[test]
fn constant_source_votes_constant() {
    let src = CompactImage::filled(9, 9, 1, 77).unwrap();
    let nnf = Nnf::from_field(3, 2, vec![[4, 4], [1, 7], [2, 2], [6, 6], [3, 5], [5, 3]]);
    let out = vote_cpu(&VoteInput {
        source_style: &src,
        nnf: &nnf,
        errors: None,
        patch_size: 5,
        mode: VoteMode::Plain,
    });
    assert_eq!(out.dimensions(), (3, 2));
    assert!(out.as_bytes().iter().all(|&v| v == 77));
}

#[test]
fn weighted_vote_prefers_low_error_patches() {
    // Both patches match source x = 0. Target pixel 1 sees source x = 1 (200) through the
    // patch at 0 and source x = 0 (0) through its own patch.
    let src = CompactImage::new(2, 1, 1, vec![0, 200]).unwrap();
    let nnf = Nnf::from_field(2, 1, vec![[0, 0], [0, 0]]);
    let errors = [0.0f32, 1.0e6];
    let input = VoteInput {
        source_style: &src,
        nnf: &nnf,
        errors: Some(&errors),
        patch_size: 3,
        mode: VoteMode::Weighted,
    };
    let weighted = vote_cpu(&input);
    let plain = vote_cpu(&VoteInput {
        mode: VoteMode::Plain,
        ..input
    });
    assert_eq!(plain.as_bytes(), &[0, 100]);
    assert_eq!(weighted.as_bytes(), &[0, 200]);
}

#[test]
fn cpu_voter_matches_free_function() {
    let src = CompactImage::filled(5, 5, 2, 9).unwrap();
    let nnf = identity(5, 5);
    let input = VoteInput {
        source_style: &src,
        nnf: &nnf,
        errors: None,
        patch_size: 3,
        mode: VoteMode::Plain,
    };
    assert_eq!(CpuVoter.vote(&input).unwrap(), vote_cpu(&input));
}
