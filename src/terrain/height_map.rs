//! per‑biome 1‑D elevation curve with linear blending across band borders

use std::ops::Range;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::config::{BiomeConfig, NoiseParams, WorldConfig};
use crate::grid::HeightMap;

/// seeded fBm source for a parameter set
pub fn fbm(params: &NoiseParams, seed: u32) -> Fbm<Perlin> {
    Fbm::<Perlin>::new(seed)
        .set_octaves(params.octaves)
        .set_persistence(params.persistence)
        .set_lacunarity(params.lacunarity)
}

/// noise rescaled into the biome's band: `top + mid + n * mid`
pub fn biome_elevations<N: NoiseFn<f64, 2>>(
    noise: &N,
    biome: &BiomeConfig,
    columns: Range<usize>,
) -> Vec<f32> {
    let band = biome.elevation;
    let mid = (band.bottom - band.top) / 2.0;
    columns
        .map(|x| {
            let n = noise.get([x as f64 / biome.height.scale, 0.0]).clamp(-1.0, 1.0) as f32;
            band.top + mid + n * mid
        })
        .collect()
}

/// height map with an injectable noise source per biome
pub fn generate_height_map_with<N, F>(config: &WorldConfig, mut noise_for: F) -> HeightMap
where
    N: NoiseFn<f64, 2>,
    F: FnMut(&BiomeConfig) -> N,
{
    let band_w = config.biome_width();
    let blend_w = config.blend_width();
    let blend_start = band_w - blend_w;
    let mut columns = vec![0.0_f32; config.width];

    for (i, biome) in config.biomes.iter().enumerate() {
        let start = i * band_w;
        let elevs = biome_elevations(&noise_for(biome), biome, start..start + band_w);

        // next biome sampled over the same absolute columns
        let next = config.biomes.get(i + 1).map(|next_biome| {
            biome_elevations(
                &noise_for(next_biome),
                next_biome,
                start + blend_start..start + band_w,
            )
        });

        for (bx, elev) in elevs.iter().enumerate() {
            columns[start + bx] = match &next {
                Some(next) if bx >= blend_start => {
                    let k = bx - blend_start;
                    // reaches 1 on the last column so the border is seamless
                    let t = (k + 1) as f32 / blend_w as f32;
                    (1.0 - t) * elev + t * next[k]
                }
                _ => *elev,
            };
        }
    }
    HeightMap::new(columns)
}

pub fn generate_height_map(config: &WorldConfig, seed: u32) -> HeightMap {
    generate_height_map_with(config, |biome| fbm(&biome.height, seed))
}

#[cfg(test)]
pub(crate) struct Flat(pub f64);

#[cfg(test)]
impl NoiseFn<f64, 2> for Flat {
    fn get(&self, _point: [f64; 2]) -> f64 {
        self.0
    }
}
