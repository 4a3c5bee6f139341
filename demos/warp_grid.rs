use gridwarp::prelude::*;
use nalgebra::Point2;

const IMAGE_SIZE: u32 = 256;

/// Black and white checkerboard with a red border column on the left,
/// emitted top-down like a decoded file
fn checkerboard(size: u32, tile: u32) -> anyhow::Result<RgbImage> {
    let data = itertools::iproduct!(0..size, 0..size)
        .flat_map(|(y, x)| {
            if x < 2 {
                [255, 0, 0]
            } else if (x / tile + y / tile) % 2 == 0 {
                [240, 240, 240]
            } else {
                [20, 20, 20]
            }
        })
        .collect::<Vec<u8>>();
    Ok(rgb_image_from_top_down(size, size, data)?)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // drags recorded in window pixels of a 640x640 viewer
    let (width, height) = (640.0, 640.0);
    let drags = [
        ((320.0, 320.0), (400.0, 300.0)),
        ((160.0, 480.0), (180.0, 520.0)),
        ((500.0, 140.0), (470.0, 170.0)),
        ((100.0, 100.0), (100.0, 100.0)),
        ((600.0, 320.0), (639.0, 320.0)),
    ];

    let config = WarpConfig::<f64>::default().with_domain(Domain::try_new(-0.95, 0.95, 20)?);

    let mut points = ControlPointSet::new();
    for (press, release) in drags {
        points.press(window_to_domain(press.0, press.1, width, height));
        let outcome = points.release(
            window_to_domain(release.0, release.1, width, height),
            &config.domain,
        );
        log::info!("drag {:?} -> {:?}: {:?}", press, release, outcome);
    }

    let source = checkerboard(IMAGE_SIZE, 32)?;
    for strategy in WarpStrategy::ALL {
        let config = config.clone().with_strategy(strategy);
        let mut grid = config.image_grid(source.clone());

        match config.warp(&mut grid, points.as_slice()) {
            Ok(filled) => {
                let changed = grid
                    .image()
                    .zip(grid.source_image())
                    .map(|(warped, source)| {
                        warped
                            .pixels()
                            .zip(source.pixels())
                            .filter(|(a, b)| a != b)
                            .count()
                    })
                    .unwrap_or(0);
                log::info!(
                    "{:?}: max vertex displacement {:.4}, {} pixels changed, {} background pixels",
                    strategy,
                    grid.max_displacement(),
                    changed,
                    filled.unwrap_or(0)
                );
            }
            Err(e) if e.is_degenerate_solve() => {
                log::warn!("{:?}: skipping warp: {}", strategy, e);
            }
            Err(e) => return Err(e.into()),
        }

        let centre = grid.vertex(10, 10);
        log::info!("{:?}: centre vertex at ({:.3}, {:.3})", strategy, centre.x, centre.y);
    }

    // a second press on the same spot must not break the radial solvers
    let duplicated = vec![
        ControlPoint::committed(Point2::new(0.1, 0.1), Point2::new(0.2, 0.1)),
        ControlPoint::committed(Point2::new(0.1, 0.1), Point2::new(0.0, 0.1)),
    ];
    if let Err(e) = config.solve(&duplicated) {
        log::warn!("duplicated sources rejected: {}", e);
    }

    for cp in points.iter() {
        println!("{}", cp);
    }

    Ok(())
}
