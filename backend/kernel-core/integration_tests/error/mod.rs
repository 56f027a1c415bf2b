mod codec;
mod run;
