use tailsplit_core::derive_substream_seed;

/// Seed for the proposals of one row chunk at one coordinate of a sweep.
pub fn proposal_seed(sweep_seed: u64, coordinate: usize, chunk: usize) -> u64 {
    let intermediate = derive_substream_seed(sweep_seed, coordinate as u64);
    derive_substream_seed(intermediate, chunk as u64)
}

/// Seed for one replication of the median validation routine.
pub fn replication_seed(master_seed: u64, replication: usize) -> u64 {
    derive_substream_seed(master_seed ^ 0xA5A5_A5A5_A5A5_A5A5, replication as u64)
}
