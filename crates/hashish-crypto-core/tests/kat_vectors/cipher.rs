//! OFB-chained XOR cipher vectors.

use hashish_crypto_core::cipher::{OfbChainedXorCipher, PasswordCipher};
use hashish_crypto_core::hash::Sha512;
use hashish_crypto_core::words::{hex_decode, hex_encode, raw_encode};

const HASHED_KEY: &str = "0xd2deaf05f6d12f53 f12700beb7d24590 a6f2613a975753ef a84596c5e9c88ae9 \
    9a2a573f0ede8ea9 70c2b75017ca5e55 c8b07c26bff7d86a 70e4496f50bec4ec";

#[test]
fn one_word_message() {
    let key = hex_decode(HASHED_KEY).expect("valid hex");
    let message = raw_encode("pass").expect("encode should succeed");
    assert_eq!(hex_encode(message.expose()), "0x0070006100730073");

    let ciphertext = OfbChainedXorCipher
        .encrypt(&key, message.expose(), &Sha512)
        .expect("encrypt should succeed");
    assert_eq!(hex_encode(ciphertext.expose()), "0xc5f5f0f03df68799");
}

#[test]
fn message_spanning_two_blocks() {
    let key = hex_decode(
        "0xec434022089bf711 8ae29ecd7205ee78 e830c1a9e017a69c 6b105c631c031dbc \
         cdf7558c9ad3727c 8a91879b7e7dce90 704aac13840b06ca be0922445558e9e8",
    )
    .expect("valid hex");
    let message: Vec<u64> = (0..9).collect();
    let ciphertext = OfbChainedXorCipher
        .encrypt(&key, &message, &Sha512)
        .expect("encrypt should succeed");
    assert_eq!(
        hex_encode(ciphertext.expose()),
        "0x48ec7dff6c2a8a06 382debfcaf6254cd 94e1172763409af3 207630f25deff64e \
         1eb87f1cd8efd910 d2fa31227bd18a6d 259d80bb4d2f478c f67092cc5458827c 7a0582f59ff270bc"
    );

    let plaintext = OfbChainedXorCipher
        .decrypt(&key, ciphertext.expose(), &Sha512)
        .expect("decrypt should succeed");
    assert_eq!(plaintext.expose(), message.as_slice());
}
