use crate::blockchain::core::chain::Block;
use crate::error::ChainError;

/// Confirms a block's stored hash is the digest of its stored fields.
pub fn validate_block_hash(block: &Block) -> Result<(), ChainError> {
    let expected = block.compute_hash();
    if expected != block.hash {
        return Err(ChainError::InvalidBlock(format!(
            "Hash mismatch at index {}. Stored {}, recomputed {}.",
            block.header.index,
            hex::encode(block.hash),
            hex::encode(expected)
        )));
    }
    Ok(())
}

/// Confirms `block` points at `previous` by stored hash.
pub fn validate_linkage(previous: &Block, block: &Block) -> Result<(), ChainError> {
    if block.header.previous_hash != previous.hash {
        return Err(ChainError::InvalidBlockLinkage(block.header.index));
    }
    Ok(())
}

/// Walks the chain from index 1 checking hash integrity and linkage, stopping
/// at the first failure. The genesis block is only checked as a link target.
/// Proof-of-work difficulty and transaction history are not re-checked.
pub fn validate_chain(blocks: &[Block]) -> Result<(), ChainError> {
    for pair in blocks.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        validate_block_hash(current)?;
        validate_linkage(previous, current)?;
    }
    Ok(())
}
