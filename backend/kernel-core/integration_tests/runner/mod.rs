mod helpers;
mod run;
mod stub_kernel;
