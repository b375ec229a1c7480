mod cipher;
mod derivation;
mod generator;
mod hmac;
mod sha512;
