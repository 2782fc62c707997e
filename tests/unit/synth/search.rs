use super::*;

fn gradient(w: u32, h: u32) -> CompactImage {
    let data = (0..h)
        .flat_map(|y| (0..w).map(move |x| ((x * 16 + y * 3) % 256) as u8))
        .collect();
    CompactImage::new(w, h, 1, data).unwrap()
}

fn level_from(source: &CompactImage) -> LevelImages {
    let guide = CompactImage::filled(source.width(), source.height(), 1, 0).unwrap();
    LevelImages {
        source_style: source.clone(),
        source_guide: guide.clone(),
        target_guide: guide,
        modulation: None,
    }
}

const STYLE: [f32; 1] = [1.0];
const GUIDE: [f32; 1] = [1.0];

fn weights(uniformity: f32) -> CostWeights<'static> {
    CostWeights {
        style: &STYLE,
        guide: &GUIDE,
        uniformity,
    }
}

#[test]
fn identical_patch_costs_only_uniformity() {
    let src = gradient(12, 12);
    let level = level_from(&src);
    let identity: Vec<[i32; 2]> = (0..12)
        .flat_map(|y| (0..12).map(move |x| [x, y]))
        .collect();
    let nnf = Nnf::from_field(12, 12, identity);

    let ctx = SearchCtx::new(&level, &src, weights(0.0), 3, &nnf);
    assert_eq!(ctx.cost(5, 5, [5, 5]), 0.0);
    assert!(ctx.cost(5, 5, [6, 5]) > 0.0);
}

#[test]
fn guide_mismatch_is_weighted() {
    let src = CompactImage::filled(8, 8, 1, 10).unwrap();
    let mut level = level_from(&src);
    level.target_guide = CompactImage::filled(8, 8, 1, 2).unwrap();
    let nnf = Nnf::from_field(1, 1, vec![[4, 4]]);

    let ctx = SearchCtx::new(&level, &src, weights(0.0), 3, &nnf);
    // 9 samples, squared difference 4, weight 1.
    assert_eq!(ctx.cost(4, 4, [4, 4]), 36.0);

    level.modulation = Some(CompactImage::filled(8, 8, 1, 0).unwrap());
    let ctx = SearchCtx::new(&level, &src, weights(0.0), 3, &nnf);
    assert_eq!(ctx.cost(4, 4, [4, 4]), 0.0);
}

#[test]
fn patch_match_never_increases_error() {
    let src = gradient(24, 24);
    let level = level_from(&src);
    let bounds = CenterBounds::new((24, 24), 5);
    let nnf = Nnf::random(24, 24, bounds, 9);
    let ctx = SearchCtx::new(&level, &src, weights(0.0), 5, &nnf);

    let before = patch_errors(&ctx, &nnf);
    let active = vec![true; before.len()];
    let (after_nnf, after) = patch_match(&ctx, nnf, &active, 4, 9);

    assert_eq!(after_nnf.as_slice().len(), before.len());
    for (a, b) in after.iter().zip(&before) {
        assert!(a <= b);
    }
    let total_before: f32 = before.iter().sum();
    let total_after: f32 = after.iter().sum();
    assert!(total_after < total_before);
}

#[test]
fn frozen_pixels_keep_their_match() {
    let src = gradient(16, 16);
    let level = level_from(&src);
    let bounds = CenterBounds::new((16, 16), 3);
    let nnf = Nnf::random(16, 16, bounds, 3);
    let ctx = SearchCtx::new(&level, &src, weights(0.0), 3, &nnf);

    let active = vec![false; 256];
    let (after, _) = patch_match(&ctx, nnf.clone(), &active, 3, 1);
    assert_eq!(after, nnf);
}
