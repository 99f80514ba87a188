#[cfg(test)]
mod support;

#[cfg(test)]
mod deployment;
#[cfg(test)]
mod discovery;
