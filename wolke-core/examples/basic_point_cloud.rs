use wolke_core::containers::PointCloud;
use wolke_core::layout::{descriptors, FieldSet};
use wolke_core::nalgebra::Vector3;

fn main() -> wolke_core::error::Result<()> {
    // A cloud declares its fields up front. Here we want positions, colors and a per-point
    // curvature descriptor:
    let fields = FieldSet::new()
        .with_positions()
        .with_colors()
        .with_descriptor(descriptors::CURVATURE);
    let mut cloud = PointCloud::new(4, fields)?;
    println!("created a cloud with fields {}", cloud.fields());

    // All buffers are default-initialized, so we can write individual points right away:
    cloud.positions_mut().set_column(0, &Vector3::new(1.0, 2.0, 3.0));
    cloud.colors_mut().set_column(0, &Vector3::new(255, 128, 0));

    // Growing the cloud default-fills the new columns:
    cloud.expand(2);
    println!("expanded to {} points", cloud.size());

    // A copy can narrow to a subset of the fields:
    let positions_only = PointCloud::from_cloud(&cloud, FieldSet::new().with_positions())?;
    println!(
        "narrowed copy has fields {} and {} points",
        positions_only.fields(),
        positions_only.size()
    );

    for i in 0..positions_only.size() {
        println!("point {}: {:?}", i, positions_only.position(i));
    }
    Ok(())
}
