use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::any::Any;
use tributary_core::{Extent, InformationVector, ModifiedTime, TimeStamp};
use tributary_data::{DataArray, DataKind, DataObject, ImageGrid};
use tributary_pipeline::{
    Algorithm, AlgorithmError, NodeId, Pipeline, PortData, Request, StreamingDriver,
};

/// Hands its input through unchanged.
struct Pass {
    mtime: ModifiedTime,
}

impl Algorithm for Pass {
    fn name(&self) -> &str {
        "Pass"
    }

    fn modified_time(&self) -> TimeStamp {
        self.mtime.get()
    }

    fn request_data(
        &mut self,
        _request: &Request,
        inputs: &[InformationVector],
        outputs: &mut InformationVector,
    ) -> Result<(), AlgorithmError> {
        let input = inputs[0]
            .data(0)
            .ok_or_else(|| AlgorithmError::bad_input(0, "missing"))?;
        outputs.set_data(0, input.shallow_copied());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn chain(length: usize) -> (Pipeline, NodeId) {
    let extent = Extent::new(0, 63, 0, 63, 0, 0);
    let mut image = ImageGrid::new(extent, [0.0; 3], [1.0; 3]);
    image.point_data_mut().add_array(DataArray::from_f64(
        "value",
        1,
        vec![1.0; extent.number_of_points()],
    ));
    let mut pipeline = Pipeline::new();
    let mut last = pipeline.add_data(DataObject::new(DataKind::ImageGrid(image)));
    for _ in 0..length {
        let next = pipeline.add(Pass {
            mtime: ModifiedTime::new(),
        });
        if pipeline.connect(last, 0, next, 0).is_err() {
            break;
        }
        last = next;
    }
    (pipeline, last)
}

fn bench_updates(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pipeline Updates");

    let (mut cached, tail) = chain(32);
    let _ = cached.update(tail, 0);
    group.bench_function("Cached update (32 nodes)", |b| {
        b.iter(|| black_box(cached.update(tail, 0)));
    });

    let (mut streamed, tail) = chain(8);
    let driver = StreamingDriver::new(8);
    group.bench_function("Streamed update (8 nodes, 8 pieces)", |b| {
        b.iter(|| black_box(driver.collect(&mut streamed, tail, 0)));
    });

    group.finish();
}

criterion_group!(benches, bench_updates);
criterion_main!(benches);
