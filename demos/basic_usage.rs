//! Basic usage example of the off-heap chunk pool

use offheap_chunks::{ChunkPool, ChunkPoolConfig, Result};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    println!("Off-heap Chunk Pool Example");
    println!("===========================");

    let config = ChunkPoolConfig::new("example_cache")
        .with_chunk_size(64 * 1024)
        .with_chunks_per_alloc(1024);
    let pool = ChunkPool::new(config)?;

    println!(
        "Pool created: {} byte chunks, {} per batch",
        pool.chunk_size(),
        pool.chunks_per_alloc()
    );
    println!("  Mapped before first acquire: {} bytes", pool.mapped_bytes());

    // Store an entry in a chunk
    let mut chunk = pool.acquire();
    chunk.write(0, b"key=value")?;
    println!(
        "  Chunk at {:#x}: {:?}",
        chunk.address(),
        std::str::from_utf8(chunk.read(0, 9)?)
    );
    println!("  Mapped after first acquire: {} bytes", pool.mapped_bytes());

    let address = chunk.address();
    pool.release(chunk);

    // The next acquire reuses the chunk just released
    let chunk = pool.acquire();
    println!("  Reused same chunk: {}", chunk.address() == address);
    pool.release(chunk);

    // Nothing to release is fine too
    pool.release(None);

    println!("{}", pool.stats().summary());
    Ok(())
}
