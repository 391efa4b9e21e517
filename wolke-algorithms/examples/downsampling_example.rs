use rand::{prelude::ThreadRng, Rng};
use wolke_algorithms::voxel_grid::voxelized_down_sample;
use wolke_core::{containers::PointCloud, layout::FieldSet, nalgebra::Vector3};

fn random_position(rng: &mut ThreadRng) -> Vector3<f32> {
    Vector3::new(
        rng.gen_range(0.0..10.0),
        rng.gen_range(0.0..10.0),
        rng.gen_range(0.0..10.0),
    )
}

fn main() -> wolke_core::error::Result<()> {
    let mut rng = rand::thread_rng();

    let mut cloud = PointCloud::new(50_000, FieldSet::new().with_positions().with_colors())?;
    for i in 0..cloud.size() {
        let position = random_position(&mut rng);
        cloud.positions_mut().set_column(i, &position);
        let color = Vector3::new(rng.gen(), rng.gen(), rng.gen::<u8>());
        cloud.colors_mut().set_column(i, &color);
    }

    let down_sampled = voxelized_down_sample(&cloud, 0.5)?;
    println!(
        "downsampled {} points to {} voxel centroids",
        cloud.size(),
        down_sampled.size()
    );
    Ok(())
}
