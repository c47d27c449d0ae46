use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

fn read_resource(name: &str) -> Vec<u8> {
    std::fs::read(format!("{}/resources/{}", env!("CARGO_MANIFEST_DIR"), name)).unwrap()
}

fn get_input() -> Vec<u8> {
    read_resource("cube.fbx")
}

fn get_binary_input() -> Vec<u8> {
    read_resource("cube_binary.fbx")
}

pub mod read {
    use divan::Bencher;
    use threed_fbx::read::Encoding;
    use threed_fbx::scope;

    #[divan::bench]
    fn scan(bencher: Bencher) {
        bencher.with_inputs(super::get_input).bench_refs(|data| {
            divan::black_box(Encoding::Text.scan(data).unwrap());
        });
    }

    #[divan::bench]
    fn scan_binary(bencher: Bencher) {
        bencher.with_inputs(super::get_binary_input).bench_refs(|data| {
            divan::black_box(Encoding::Binary.scan(data).unwrap());
        });
    }

    #[divan::bench]
    fn parse(bencher: Bencher) {
        bencher
            .with_inputs(|| Encoding::Text.scan(&super::get_input()).unwrap())
            .bench_values(|tokens| {
                divan::black_box(scope::parse(tokens).unwrap());
            });
    }
}

pub mod build {
    use divan::Bencher;
    use threed_fbx::{FbxDocument, FbxLoadOptions};

    #[divan::bench]
    fn to_scene(bencher: Bencher) {
        let document = FbxDocument::parse(&super::get_input()).unwrap();
        let options = FbxLoadOptions::default();
        bencher.bench_local(|| {
            divan::black_box(document.to_scene(&options));
        });
    }

    #[divan::bench]
    fn load(bencher: Bencher) {
        let options = FbxLoadOptions::default();
        bencher.with_inputs(super::get_input).bench_refs(|data| {
            divan::black_box(threed_fbx::load(data, &options).unwrap());
        });
    }
}
