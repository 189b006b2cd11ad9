//! End-to-end masking scenarios on synthetic images.

use std::sync::Arc;

use face_mask::{
    default_sample_points, fill_region, geometry, sample_color, silhouette_from_parts,
    BoundingBox, Color, Detection, Error, LandmarkProvider, LandmarkSet, MaskOptions,
    MaskPipeline, MaskSession, Point, RasterSurface, Result, StaticLandmarks,
};
use image::{Rgba, RgbaImage};
use tokio::sync::Notify;

const BACKGROUND: [u8; 4] = [40, 40, 40, 255];
const SKIN: [u8; 4] = [200, 150, 100, 255];

fn face_box() -> BoundingBox {
    BoundingBox::new(50.0, 80.0, 200.0, 200.0)
}

/// Dark image where only the two cheek sample pixels carry the skin tone.
fn image_with_cheeks(landmarks: &LandmarkSet) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(300, 300, Rgba(BACKGROUND));
    for cheek in landmarks.cheeks() {
        image.put_pixel(cheek.x.round() as u32, cheek.y.round() as u32, Rgba(SKIN));
    }
    image
}

#[test]
fn square_jaw_fills_union_without_holes() {
    // Jaw runs down the left side, across the bottom and up the right side.
    let jaw = [
        Point::new(20.0, 40.0),
        Point::new(20.0, 80.0),
        Point::new(80.0, 80.0),
        Point::new(80.0, 40.0),
    ];
    let left_brow = [Point::new(20.0, 50.0), Point::new(40.0, 50.0)];
    let right_brow = [Point::new(60.0, 50.0), Point::new(80.0, 50.0)];

    let region = silhouette_from_parts(&jaw, &left_brow, &right_brow, 30.0);
    assert!(geometry::is_simple(&region.points));
    assert!((geometry::polygon_area(&region.points) - 3600.0).abs() < 0.01);

    let mut surface = RasterSurface::filled(100, 100, BACKGROUND);
    let color = Color::new(255, 0, 255);
    fill_region(&mut surface, &region, color);

    for y in 0..100u32 {
        for x in 0..100u32 {
            let px = surface.pixel(x, y).unwrap();
            if (21..=78).contains(&x) && (21..=78).contains(&y) {
                assert_eq!(px, color.to_rgba(), "hole at ({x}, {y})");
            } else if !(19..=80).contains(&x) || !(19..=80).contains(&y) {
                assert_eq!(px, BACKGROUND, "leak at ({x}, {y})");
            }
        }
    }
}

#[test]
fn cheek_samples_give_exact_color() {
    let landmarks = LandmarkSet::mean_face(&face_box());
    let surface = RasterSurface::from_image(&image_with_cheeks(&landmarks));

    let points = default_sample_points(&surface, Some(&landmarks));
    assert_eq!(points.len(), 2);
    assert_eq!(sample_color(&surface, &points), Color::new(200, 150, 100));
}

#[tokio::test]
async fn no_detection_leaves_surface_as_drawn() {
    let image = image_with_cheeks(&LandmarkSet::mean_face(&face_box()));
    let pipeline = MaskPipeline::new(StaticLandmarks::none(), MaskOptions::default()).unwrap();
    let session = MaskSession::new(pipeline);

    let err = session.submit(&image).await.unwrap_err();
    assert!(matches!(err, Error::NoFaceDetected));
    assert!(!err.is_not_ready());

    let surface = session.snapshot().await.unwrap();
    assert_eq!(surface.as_image(), &image);
    assert!(session.color().await.is_none());
}

#[tokio::test]
async fn full_pipeline_fills_face_and_clears_features() {
    let landmarks = LandmarkSet::mean_face(&face_box());
    let image = image_with_cheeks(&landmarks);
    let pipeline =
        MaskPipeline::new(StaticLandmarks::mean_face(face_box()), MaskOptions::default()).unwrap();

    let masked = pipeline.mask_image(&image).await.unwrap();
    let surface = &masked.surface;

    assert_eq!(masked.outcome.color, Color::new(200, 150, 100));

    // Outside the silhouette nothing changes.
    assert_eq!(surface.pixel(5, 5), Some(BACKGROUND));
    assert_eq!(surface.pixel(295, 295), Some(BACKGROUND));

    // Forehead, between the raised brows and the eyes, is skin.
    let forehead = Point::new(150.0, landmarks[19].y - 30.0);
    assert_eq!(
        surface.pixel(forehead.x as u32, forehead.y as u32),
        Some(SKIN)
    );

    // Features are cut out on top of the fill.
    for idx in [37, 44, 33, 57] {
        let p = landmarks[idx];
        assert_eq!(
            surface.pixel(p.x as u32, p.y as u32),
            Some([0, 0, 0, 0]),
            "landmark {idx}"
        );
    }

    // The source image is untouched.
    assert_eq!(image.get_pixel(150, 150).0, BACKGROUND);
}

#[tokio::test]
async fn larger_forehead_offset_reaches_higher() {
    let landmarks = LandmarkSet::mean_face(&face_box());
    let image = image_with_cheeks(&landmarks);
    let above_brow = Point::new(150.0, landmarks[21].y - 55.0);

    let mut painted = Vec::new();
    for offset in [50.0, 60.0] {
        let options = MaskOptions {
            forehead_offset_px: offset,
            ..Default::default()
        };
        let pipeline = MaskPipeline::new(StaticLandmarks::mean_face(face_box()), options).unwrap();
        let masked = pipeline.mask_image(&image).await.unwrap();
        painted.push(masked.surface.pixel(above_brow.x as u32, above_brow.y as u32));
    }

    assert_eq!(painted, vec![Some(BACKGROUND), Some(SKIN)]);
}

/// Holds detection of red images until released, answers others at once.
struct GatedProvider {
    gate: Arc<Notify>,
    detection: Detection,
}

impl LandmarkProvider for GatedProvider {
    async fn detect_face(&self, image: &RgbaImage) -> Result<Option<Detection>> {
        if image.get_pixel(0, 0).0 == [255, 0, 0, 255] {
            self.gate.notified().await;
        }
        Ok(Some(self.detection.clone()))
    }
}

#[tokio::test]
async fn stale_result_cannot_clobber_newer_image() {
    let gate = Arc::new(Notify::new());
    let provider = GatedProvider {
        gate: Arc::clone(&gate),
        detection: Detection {
            bounding_box: BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            landmarks: LandmarkSet::mean_face(&BoundingBox::new(0.0, 0.0, 100.0, 100.0)),
        },
    };
    let session = MaskSession::new(MaskPipeline::new(provider, MaskOptions::default()).unwrap());

    let red = RgbaImage::from_pixel(120, 120, Rgba([255, 0, 0, 255]));
    let blue = RgbaImage::from_pixel(120, 120, Rgba([0, 0, 255, 255]));

    let (stale, fresh) = tokio::join!(session.submit(&red), async {
        let outcome = session.submit(&blue).await;
        gate.notify_one();
        outcome
    });

    assert!(matches!(stale, Err(Error::Superseded { generation: 1 })));
    assert_eq!(fresh.unwrap().color, Color::new(0, 0, 255));

    let surface = session.snapshot().await.unwrap();
    assert_eq!(surface.pixel(119, 119), Some([0, 0, 255, 255]));
    assert_eq!(session.color().await, Some(Color::new(0, 0, 255)));
}

/// Yields to the scheduler before answering so runs interleave across workers.
struct YieldingProvider {
    detection: Detection,
}

impl LandmarkProvider for YieldingProvider {
    async fn detect_face(&self, _image: &RgbaImage) -> Result<Option<Detection>> {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        Ok(Some(self.detection.clone()))
    }
}

fn yielding_session() -> Arc<MaskSession<YieldingProvider>> {
    let face = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let provider = YieldingProvider {
        detection: Detection {
            bounding_box: face,
            landmarks: LandmarkSet::mean_face(&face),
        },
    };
    Arc::new(MaskSession::new(
        MaskPipeline::new(provider, MaskOptions::default()).unwrap(),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn newest_submission_survives_concurrent_submits() {
    const RUNS: u8 = 8;

    for _ in 0..20 {
        let session = yielding_session();
        let handles: Vec<_> = (0..RUNS)
            .map(|i| {
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    let image = RgbaImage::from_pixel(120, 120, Rgba([i * 30, 0, 255 - i * 30, 255]));
                    session.submit(&image).await
                })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(session.generation().await, Some(RUNS as u64));
        for result in &results {
            match result {
                Ok(_) => {}
                Err(Error::Superseded { generation }) => assert!(*generation < RUNS as u64),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        // The newest run always composites, and the surface is its image.
        let color = session.color().await.unwrap();
        assert!(results.iter().any(|r| matches!(r, Ok(o) if o.color == color)));
        let surface = session.snapshot().await.unwrap();
        assert_eq!(surface.pixel(119, 119), Some(color.to_rgba()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn brush_strokes_serialize_with_resubmission() {
    let blue = Color::new(0, 0, 255);

    for _ in 0..20 {
        let session = yielding_session();
        session
            .submit(&RgbaImage::from_pixel(120, 120, Rgba([255, 0, 0, 255])))
            .await
            .unwrap();

        let corner = [Point::new(115.0, 115.0)];
        let brushes: Vec<_> = (0..8)
            .map(|_| {
                let session = Arc::clone(&session);
                tokio::spawn(async move { session.brush(&corner, Some(3.0)).await })
            })
            .collect();
        let resubmit = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .submit(&RgbaImage::from_pixel(120, 120, Rgba(blue.to_rgba())))
                    .await
            })
        };

        for brush in brushes {
            match brush.await.unwrap() {
                Ok(()) | Err(Error::NoSampledColor) => {}
                Err(e) => panic!("unexpected brush error: {e}"),
            }
        }
        assert_eq!(resubmit.await.unwrap().unwrap().color, blue);

        // A stroke started on the red image never lands red paint on the blue one.
        assert_eq!(session.generation().await, Some(2));
        assert_eq!(session.color().await, Some(blue));
        let surface = session.snapshot().await.unwrap();
        assert_eq!(surface.pixel(115, 115), Some(blue.to_rgba()));
        assert_eq!(surface.pixel(119, 119), Some(blue.to_rgba()));
    }
}
