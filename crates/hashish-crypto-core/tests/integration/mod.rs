mod benchmark_calibration;
mod descriptor_roundtrip;
mod secret_hygiene;
mod selftest_runner;
