use ndarray::{arr2, Array2, Array3, Axis};
use pixelplane::filters::{
    convolve2d, filter2d, ConvolutionStrategy, Convolver, DirectConvolver, FftConvolver, FilterOptions, Preset,
};
use pixelplane::transform::resize;
use pixelplane::Image;

fn noise_plane(h: usize, w: usize, seed: u64) -> Array2<u8> {
    let mut state = seed.wrapping_add(1);
    Array2::from_shape_fn((h, w), |_| {
        state = state.wrapping_mul(48271).wrapping_add(1) % 2147483647;
        (state % 256) as u8
    })
}

fn noise_image(h: usize, w: usize, channels: usize) -> Image<u8> {
    let planes = (0..channels).map(|c| noise_plane(h, w, c as u64 * 31 + 7)).collect();
    Image::from_planes(planes).unwrap()
}

fn kernels() -> Vec<Array2<f64>> {
    let mut out: Vec<Array2<f64>> = Preset::ALL.iter().map(|p| p.kernel()).collect();
    out.push(arr2(&[[1.0, 2.0, 1.0]]));
    out.push(arr2(&[[-3.0], [0.0], [3.0]]));
    out
}

#[test]
fn filter_preserves_shape() {
    let strategies = [
        ConvolutionStrategy::Direct,
        ConvolutionStrategy::Im2Col,
        ConvolutionStrategy::Fft,
        ConvolutionStrategy::Auto,
    ];
    let image = noise_image(9, 6, 3);
    let plane = Image::plane(noise_plane(4, 11, 3));

    for kernel in kernels() {
        for strategy in strategies {
            let options = FilterOptions::default().with_strategy(strategy);
            let out = filter2d(&image, kernel.view(), &options).unwrap();
            assert_eq!(out.shape(), image.shape());

            let out = filter2d(&plane, kernel.view(), &options).unwrap();
            assert_eq!(out.shape(), plane.shape());
        }
    }
}

#[test]
fn integral_outputs_stay_in_range() {
    let image = Image::plane(noise_plane(12, 12, 99).mapv(|v| v as i16 * 100 - 12_800));
    let kernel = arr2(&[[-9.0, -9.0, -9.0], [-9.0, 80.0, -9.0], [-9.0, -9.0, -9.0]]);
    let options = FilterOptions::default().with_scale(1.0);
    let out = filter2d(&image, kernel.view(), &options).unwrap();

    let plane = out.plane_at(0).unwrap();
    assert!(plane.iter().any(|&v| v == i16::MAX));
    assert!(plane.iter().any(|&v| v == i16::MIN));
}

#[test]
fn per_channel_independence() {
    let image = noise_image(7, 8, 4);
    let kernel = Preset::Sharpen.kernel();
    let options = FilterOptions::default().with_scale(16.0);

    let filtered = filter2d(&image, kernel.view(), &options).unwrap();
    let resized = resize(&image, 5, 13).unwrap();

    for (c, plane) in image.planes().enumerate() {
        let single = Image::plane(plane.to_owned());
        let f = filter2d(&single, kernel.view(), &options).unwrap();
        assert_eq!(f.plane_at(0).unwrap(), filtered.plane_at(c).unwrap());

        let r = resize(&single, 5, 13).unwrap();
        assert_eq!(r.plane_at(0).unwrap(), resized.plane_at(c).unwrap());
    }
}

#[test]
fn convolution_is_linear_in_kernel() {
    let a = noise_plane(10, 12, 5).mapv(f64::from);
    let k1 = arr2(&[[0.5, -1.0, 2.0], [1.0, 0.0, 0.25], [3.0, -2.0, 1.0]]);
    let k2 = arr2(&[[1.0, 1.0, 1.0], [-4.0, 8.0, 0.5], [0.0, 2.0, -1.0]]);
    let sum = &k1 + &k2;

    for convolver in [&DirectConvolver as &dyn Convolver, &FftConvolver] {
        let lhs = convolver.convolve_valid(a.view(), sum.view()).unwrap();
        let rhs = convolver.convolve_valid(a.view(), k1.view()).unwrap()
            + convolver.convolve_valid(a.view(), k2.view()).unwrap();
        for (x, y) in lhs.iter().zip(rhs.iter()) {
            assert!((x - y).abs() < 1e-6 * (1.0 + y.abs()), "{} {x} vs {y}", convolver.name());
        }
    }

    let reference = convolve2d(a.view(), sum.view()).unwrap();
    assert_eq!(reference.dim(), (8, 10));
}

#[test]
fn identity_resize_reproduces_input() {
    let image = noise_image(13, 5, 3);
    assert_eq!(resize(&image, 13, 5).unwrap(), image);

    let signed = Image::plane(noise_plane(6, 6, 2).mapv(|v| v as i32 - 128));
    assert_eq!(resize(&signed, 6, 6).unwrap(), signed);
}

#[test]
fn pinned_filter_scenario() {
    let image = Image::plane(arr2(&[
        [0u8, 32, 0, 32, 0],
        [32, 0, 128, 0, 32],
        [0, 128, 255, 128, 0],
        [32, 0, 128, 0, 32],
        [0, 32, 0, 32, 0],
    ]));
    let kernel = arr2(&[[1.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 1.0]]);
    let out = filter2d(&image, kernel.view(), &FilterOptions::default()).unwrap();

    assert_eq!(
        out,
        Image::Plane(arr2(&[
            [5, 25, 15, 25, 5],
            [25, 44, 93, 44, 25],
            [15, 93, 137, 93, 15],
            [25, 44, 93, 44, 25],
            [5, 25, 15, 25, 5],
        ]))
    );
}

#[test]
fn pinned_resize_scenario() {
    let small = arr2(&[[56u8, 8], [8, 32]]);
    let large = arr2(&[[56u8, 44, 20, 8], [44, 37, 22, 14], [20, 22, 25, 26], [8, 14, 26, 32]]);

    let mut cube = Array3::<u8>::zeros((2, 2, 3));
    for c in 0..3 {
        cube.index_axis_mut(Axis(2), c).assign(&small);
    }
    let color = Image::from_array3(cube.view()).unwrap();

    let up = resize(&color, 4, 4).unwrap();
    for plane in up.planes() {
        assert_eq!(plane, large);
    }

    let down = resize(&Image::plane(large), 2, 2).unwrap();
    assert_eq!(down, Image::Plane(arr2(&[[45, 16], [16, 27]])));
}

#[test]
fn presets_run_on_all_sample_types() {
    let plane = noise_plane(6, 6, 1);
    let as_f32 = Image::plane(plane.mapv(f32::from));
    let as_u16 = Image::plane(plane.mapv(u16::from));
    let as_i64 = Image::plane(plane.mapv(i64::from));

    for preset in Preset::ALL {
        assert_eq!(preset.apply(&as_f32).unwrap().dim(), (6, 6));
        assert_eq!(preset.apply(&as_u16).unwrap().dim(), (6, 6));
        assert_eq!(preset.apply(&as_i64).unwrap().dim(), (6, 6));
    }
}
